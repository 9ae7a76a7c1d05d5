//! Error type for API handlers.
//!
//! Every variant maps to a status code and a user-safe JSON body of the form
//! `{"error": "..."}`. Internal details are logged before they are dropped.

use crate::mail::MailError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rootcause::prelude::Report;
use schoolbook_authz::{AuthzError, DenyReason};
use schoolbook_platform_access::{AuthError, PasswordError, TokenError};
use serde_json::json;
use std::fmt;

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No usable bearer token.
    Unauthorized(AuthError),
    /// Login with an unknown username or a wrong password.
    InvalidCredentials,
    /// The policy engine denied the request.
    Forbidden { reason: DenyReason },
    /// The target does not exist (reported only after an Allow).
    NotFound { what: &'static str },
    /// The request body is missing required fields.
    BadRequest { message: String },
    /// Permission could not be determined.
    StorageUnavailable { details: String },
    /// A storage query failed outside the policy engine.
    Database { details: String },
    /// Mail delivery is not configured.
    MailNotConfigured,
    /// Mail delivery failed.
    MailFailed { details: String },
    /// Any other server-side failure.
    Internal { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized(err) => write!(f, "unauthorized: {err}"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Forbidden { reason } => write!(f, "forbidden: {reason}"),
            Self::NotFound { what } => write!(f, "{what} not found"),
            Self::BadRequest { message } => write!(f, "bad request: {message}"),
            Self::StorageUnavailable { details } => write!(f, "storage unavailable: {details}"),
            Self::Database { details } => write!(f, "database error: {details}"),
            Self::MailNotConfigured => write!(f, "email not configured"),
            Self::MailFailed { details } => write!(f, "email failed: {details}"),
            Self::Internal { details } => write!(f, "internal error: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Returns the status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database { .. }
            | Self::MailNotConfigured
            | Self::MailFailed { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message shown to the client.
    ///
    /// Denials share one message whatever the reason, so a caller cannot tell
    /// a resource it may not see from one that does not exist.
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(AuthError::Missing) => "No token".to_string(),
            Self::Unauthorized(AuthError::Invalid) => "Invalid token".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::Forbidden { .. } => "forbidden".to_string(),
            Self::NotFound { what } => format!("{} not found", capitalize(what)),
            Self::BadRequest { message } => message.clone(),
            Self::StorageUnavailable { .. } => "Service temporarily unavailable".to_string(),
            Self::Database { .. } => "Database error".to_string(),
            Self::MailNotConfigured => "Email not configured".to_string(),
            Self::MailFailed { .. } => "Failed to send email".to_string(),
            Self::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::StorageUnavailable { .. }
            | Self::Database { .. }
            | Self::MailFailed { .. }
            | Self::Internal { .. } => tracing::error!(error = %self, "request failed"),
            Self::Forbidden { reason } => tracing::debug!(%reason, "request denied"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database {
            details: err.to_string(),
        }
    }
}

impl From<Report<AuthzError>> for ApiError {
    fn from(report: Report<AuthzError>) -> Self {
        Self::StorageUnavailable {
            details: report.to_string(),
        }
    }
}

impl From<Report<MailError>> for ApiError {
    fn from(report: Report<MailError>) -> Self {
        Self::MailFailed {
            details: report.to_string(),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        Self::Internal {
            details: err.to_string(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        Self::Internal {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::Unauthorized(AuthError::Missing).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden {
                reason: DenyReason::NotOwner
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::StorageUnavailable {
                details: "timeout".into()
            }
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::MailNotConfigured.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn denials_share_one_message() {
        let messages: Vec<String> = [
            DenyReason::InsufficientRole,
            DenyReason::NotOwner,
            DenyReason::UnknownPolicy,
        ]
        .into_iter()
        .map(|reason| ApiError::Forbidden { reason }.public_message())
        .collect();

        assert!(messages.iter().all(|m| m == "forbidden"));
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let err = ApiError::Database {
            details: "relation \"users\" does not exist".into(),
        };
        assert_eq!(err.public_message(), "Database error");

        let err = ApiError::NotFound { what: "student" };
        assert_eq!(err.public_message(), "Student not found");
    }

    #[test]
    fn authz_report_maps_to_unavailable() {
        let report: Report<AuthzError> = AuthzError::StorageUnavailable {
            details: "connection refused".into(),
        }
        .into();
        let err = ApiError::from(report);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
