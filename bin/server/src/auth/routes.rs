//! Login and current-principal routes.

use axum::{Json, extract::State};
use schoolbook_platform_access::{PasswordError, Principal, verify_password};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{AppState, RequireAuth};
use crate::db::{UserRecord, UserRepository};
use crate::error::ApiError;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
}

/// Exchanges a username and password for a bearer token.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) = match (request.username, request.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(ApiError::BadRequest {
                message: "username & password required".to_string(),
            });
        }
    };

    let users = UserRepository::new(state.db_pool.clone());
    let credentials = users
        .find_by_username(&username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    match verify_password(&password, &credentials.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(ApiError::InvalidCredentials),
        Err(PasswordError::InvalidStoredHash { reason }) => {
            warn!(%username, %reason, "stored password hash is unusable");
            return Err(ApiError::InvalidCredentials);
        }
        Err(e) => return Err(e.into()),
    }

    let user = credentials.user;
    let token = state
        .tokens
        .issue(user.id, &user.username, user.role, &user.name)?;

    info!(user_id = %user.id, role = %user.role, "login");
    Ok(Json(LoginResponse { token, user }))
}

/// Returns the caller's principal.
pub async fn me(RequireAuth(principal): RequireAuth) -> Json<Principal> {
    Json(principal)
}
