//! Account management routes.

use axum::{Json, extract::State};
use schoolbook_authz::{Action, ResourceRef};
use schoolbook_platform_access::hash_password;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::auth::{AppState, RequireAuth};
use crate::db::{NewUser, UserRecord, UserRepository};
use crate::error::ApiError;

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserRecord>>, ApiError> {
    state
        .authorize(&principal, Action::Read, &ResourceRef::user_accounts())
        .await?;

    let users = UserRepository::new(state.db_pool.clone()).list().await?;
    Ok(Json(users))
}

/// Creates an account. The password is stored only as an Argon2 hash.
#[instrument(skip_all)]
pub async fn create(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(user): Json<NewUser>,
) -> Result<Json<UserRecord>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::user_accounts())
        .await?;

    if user.username.trim().is_empty() || user.password.is_empty() {
        return Err(ApiError::BadRequest {
            message: "username & password required".to_string(),
        });
    }
    let name = if user.name.trim().is_empty() {
        user.username.clone()
    } else {
        user.name.clone()
    };

    let hash = hash_password(&user.password)?;
    let record = UserRepository::new(state.db_pool.clone())
        .create(user.username.trim(), &hash, user.role, &name)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::BadRequest {
                message: "username already exists".to_string(),
            },
            _ => e.into(),
        })?;

    info!(user_id = %record.id, role = %record.role, "account created");
    Ok(Json(record))
}
