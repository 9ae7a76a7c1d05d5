//! Student routes, including the summary and parent mail.

use axum::{
    Json,
    extract::{Path, State},
};
use schoolbook_authz::{Action, ResourceRef};
use schoolbook_core::StudentId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

use super::Success;
use crate::auth::{AppState, RequireAuth};
use crate::db::{
    GradeRecord, GradeRepository, StudentFields, StudentRecord, StudentRepository, SubjectAverage,
};
use crate::error::ApiError;
use crate::mail::OutgoingMail;

/// A student with their grades and averages.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student: StudentRecord,
    pub grades: Vec<GradeRecord>,
    pub per_subject: Vec<SubjectAverage>,
    pub overall: Option<f64>,
}

/// Parent mail request body.
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn validate(fields: &StudentFields) -> Result<(), ApiError> {
    match fields.missing_field() {
        Some(field) => Err(ApiError::BadRequest {
            message: format!("{field} required"),
        }),
        None => Ok(()),
    }
}

/// Lists the students the caller may see.
#[instrument(skip_all)]
pub async fn list(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StudentRecord>>, ApiError> {
    let scope = state.scope(&principal).await?;
    let students = StudentRepository::new(state.db_pool.clone())
        .list(&scope)
        .await?;
    Ok(Json(students))
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(fields): Json<StudentFields>,
) -> Result<Json<StudentRecord>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::students())
        .await?;
    validate(&fields)?;

    let student = StudentRepository::new(state.db_pool.clone())
        .create(&fields)
        .await?;
    info!(student_id = %student.id, "student created");
    Ok(Json(student))
}

#[instrument(skip(principal, state))]
pub async fn get(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<StudentId>,
) -> Result<Json<StudentRecord>, ApiError> {
    state
        .authorize(&principal, Action::Read, &ResourceRef::student(id))
        .await?;

    StudentRepository::new(state.db_pool.clone())
        .find(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound { what: "student" })
}

#[instrument(skip(principal, state, fields))]
pub async fn update(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<StudentId>,
    Json(fields): Json<StudentFields>,
) -> Result<Json<StudentRecord>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::student(id))
        .await?;
    validate(&fields)?;

    StudentRepository::new(state.db_pool.clone())
        .update(id, &fields)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound { what: "student" })
}

#[instrument(skip(principal, state))]
pub async fn delete(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<StudentId>,
) -> Result<Json<Success>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::student(id))
        .await?;

    if !StudentRepository::new(state.db_pool.clone())
        .delete(id)
        .await?
    {
        return Err(ApiError::NotFound { what: "student" });
    }
    info!(student_id = %id, "student deleted");
    Ok(Json(Success::OK))
}

/// Returns a student with grades (newest first) and averages.
#[instrument(skip(principal, state))]
pub async fn summary(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<StudentId>,
) -> Result<Json<StudentSummary>, ApiError> {
    state
        .authorize(&principal, Action::Read, &ResourceRef::student(id))
        .await?;

    let student = StudentRepository::new(state.db_pool.clone())
        .find(id)
        .await?
        .ok_or(ApiError::NotFound { what: "student" })?;

    let grades = GradeRepository::new(state.db_pool.clone());
    Ok(Json(StudentSummary {
        student,
        grades: grades.list_for_student(id).await?,
        per_subject: grades.subject_averages(id).await?,
        overall: grades.overall_average(id).await?,
    }))
}

/// Mails a student's parent.
#[instrument(skip(principal, state, request))]
pub async fn send_email(
    RequireAuth(principal): RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<StudentId>,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<Success>, ApiError> {
    state
        .authorize(&principal, Action::Write, &ResourceRef::student(id))
        .await?;

    let student = StudentRepository::new(state.db_pool.clone())
        .find(id)
        .await?
        .ok_or(ApiError::NotFound { what: "student" })?;

    let mailer = state.mailer.as_ref().ok_or(ApiError::MailNotConfigured)?;
    let to = student
        .parent_email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest {
            message: "Student has no parent email".to_string(),
        })?;

    let mail = OutgoingMail::new(to, request.subject, request.message);
    mailer.send(&mail).await?;

    info!(student_id = %id, "parent mail sent");
    Ok(Json(Success::OK))
}
