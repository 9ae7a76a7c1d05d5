//! Family link management routes.

use axum::{
    Json,
    extract::{Path, State},
};
use schoolbook_authz::{Action, FamilyLink, ResourceRef};
use schoolbook_core::{StudentId, UserId};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::Success;
use crate::auth::{AppState, RequireAuth};
use crate::db::FamilyLinkRepository;
use crate::error::ApiError;

/// Link request body. The relation defaults to `parent`.
#[derive(Debug, Deserialize)]
pub struct NewFamilyLink {
    user_id: UserId,
    student_id: StudentId,
    #[serde(default)]
    relation: Option<String>,
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FamilyLink>>, ApiError> {
    state
        .authorize(&principal, Action::Read, &ResourceRef::family_links())
        .await?;

    let links = FamilyLinkRepository::new(state.db_pool.clone())
        .list()
        .await?;
    Ok(Json(links))
}

#[instrument(skip(principal, state))]
pub async fn create(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewFamilyLink>,
) -> Result<Json<FamilyLink>, ApiError> {
    state
        .authorize(
            &principal,
            Action::Write,
            &ResourceRef::family_link(request.user_id, request.student_id),
        )
        .await?;

    let link = FamilyLink {
        user_id: request.user_id,
        student_id: request.student_id,
        relation: request
            .relation
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "parent".to_string()),
    };

    let stored = FamilyLinkRepository::new(state.db_pool.clone())
        .upsert(&link)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => ApiError::BadRequest {
                message: "unknown user or student".to_string(),
            },
            _ => e.into(),
        })?;

    info!(user_id = %stored.user_id, student_id = %stored.student_id, "family link saved");
    Ok(Json(stored))
}

#[instrument(skip(principal, state))]
pub async fn delete(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path((user_id, student_id)): Path<(UserId, StudentId)>,
) -> Result<Json<Success>, ApiError> {
    state
        .authorize(
            &principal,
            Action::Write,
            &ResourceRef::family_link(user_id, student_id),
        )
        .await?;

    if !FamilyLinkRepository::new(state.db_pool.clone())
        .delete(user_id, student_id)
        .await?
    {
        return Err(ApiError::NotFound {
            what: "family link",
        });
    }
    Ok(Json(Success::OK))
}
