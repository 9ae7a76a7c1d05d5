//! Grade routes.

use axum::{
    Json,
    extract::{Path, State},
};
use schoolbook_authz::{Action, ResourceRef};
use schoolbook_core::{GradeId, StudentId};
use std::sync::Arc;
use tracing::{info, instrument};

use super::Success;
use crate::auth::{AppState, RequireAuth};
use crate::db::{GradeRecord, GradeRepository, NewGrade};
use crate::error::ApiError;

#[instrument(skip(principal, state))]
pub async fn list_for_student(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<StudentId>,
) -> Result<Json<Vec<GradeRecord>>, ApiError> {
    state
        .authorize(&principal, Action::Read, &ResourceRef::grades_of(student_id))
        .await?;

    let grades = GradeRepository::new(state.db_pool.clone())
        .list_for_student(student_id)
        .await?;
    Ok(Json(grades))
}

#[instrument(skip(principal, state, grade))]
pub async fn create(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(student_id): Path<StudentId>,
    Json(grade): Json<NewGrade>,
) -> Result<Json<GradeRecord>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::grades_of(student_id))
        .await?;

    if grade.subject.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "subject required".to_string(),
        });
    }
    if !grade.score.is_finite() {
        return Err(ApiError::BadRequest {
            message: "score must be a number".to_string(),
        });
    }

    let record = GradeRepository::new(state.db_pool.clone())
        .create(student_id, &grade)
        .await?
        .ok_or(ApiError::NotFound { what: "student" })?;
    info!(grade_id = %record.id, %student_id, "grade added");
    Ok(Json(record))
}

/// Deletes a grade.
///
/// The role gate runs on the bare resource type first, so a caller who may
/// never write grades is refused without the owner lookup.
#[instrument(skip(principal, state))]
pub async fn delete(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<GradeId>,
) -> Result<Json<Success>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::grades())
        .await?;

    let grades = GradeRepository::new(state.db_pool.clone());
    let owner = grades
        .find_owner(id)
        .await?
        .ok_or(ApiError::NotFound { what: "grade" })?;
    state
        .authorize(&principal, Action::Write, &ResourceRef::grade(id, owner))
        .await?;

    if !grades.delete(id).await? {
        return Err(ApiError::NotFound { what: "grade" });
    }
    info!(grade_id = %id, student_id = %owner, "grade deleted");
    Ok(Json(Success::OK))
}
