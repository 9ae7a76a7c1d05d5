//! Authentication extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use schoolbook_platform_access::{AuthError, Principal};
use std::sync::Arc;

use super::AppState;
use crate::error::ApiError;

/// Extractor for requiring an authenticated principal.
///
/// Rejects with `401` when the `Authorization` header is missing, is not a
/// bearer token, or carries a token that does not verify.
pub struct RequireAuth(pub Principal);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let header = match parts.headers.get(AUTHORIZATION) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| AuthError::Invalid)?),
        };

        let principal = app_state.resolver.resolve(header)?;
        Ok(RequireAuth(principal))
    }
}
