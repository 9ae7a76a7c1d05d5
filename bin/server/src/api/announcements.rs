//! Announcement routes.

use axum::{
    Json,
    extract::{Path, State},
};
use schoolbook_authz::{Action, ResourceRef};
use schoolbook_core::AnnouncementId;
use std::sync::Arc;
use tracing::{info, instrument};

use super::Success;
use crate::auth::{AppState, RequireAuth};
use crate::db::{AnnouncementRecord, AnnouncementRepository, NewAnnouncement};
use crate::error::ApiError;

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AnnouncementRecord>>, ApiError> {
    state
        .authorize(&principal, Action::Read, &ResourceRef::announcements())
        .await?;

    let announcements = AnnouncementRepository::new(state.db_pool.clone())
        .list()
        .await?;
    Ok(Json(announcements))
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(announcement): Json<NewAnnouncement>,
) -> Result<Json<AnnouncementRecord>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::announcements())
        .await?;

    if announcement.title.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "title required".to_string(),
        });
    }

    let record = AnnouncementRepository::new(state.db_pool.clone())
        .create(&announcement)
        .await?;
    info!(announcement_id = %record.id, "announcement published");
    Ok(Json(record))
}

#[instrument(skip(principal, state))]
pub async fn delete(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<AnnouncementId>,
) -> Result<Json<Success>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::announcement(id))
        .await?;

    if !AnnouncementRepository::new(state.db_pool.clone())
        .delete(id)
        .await?
    {
        return Err(ApiError::NotFound {
            what: "announcement",
        });
    }
    Ok(Json(Success::OK))
}
