//! Identity resolution: bearer credential in, principal out.

use crate::error::AuthError;
use crate::principal::Principal;
use crate::role::Role;
use crate::token::CredentialVerifier;
use chrono::{DateTime, Utc};
use schoolbook_core::UserId;
use std::sync::Arc;
use tracing::debug;

/// Turns the `Authorization` header of a request into a [`Principal`].
///
/// Holds no state besides the verifier and performs no I/O beyond the
/// verification call, so one instance is shared by every request.
#[derive(Clone)]
pub struct IdentityResolver {
    verifier: Arc<dyn CredentialVerifier>,
}

impl IdentityResolver {
    /// Creates a resolver backed by `verifier`.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolves the raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - `AuthError::Missing` when there is no bearer material at all.
    /// - `AuthError::Invalid` when the token fails verification, has expired,
    ///   or carries claims that do not describe a known account and role.
    pub fn resolve(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        self.resolve_at(authorization, Utc::now())
    }

    /// Resolves against an explicit clock reading.
    ///
    /// # Errors
    ///
    /// Same as [`IdentityResolver::resolve`].
    pub fn resolve_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let token = bearer_token(authorization)?;

        let claims = self.verifier.verify(token).map_err(|e| {
            debug!(error = %e, "token verification failed");
            AuthError::Invalid
        })?;

        // Expiry is enforced here too, whatever leeway the verifier applies.
        if claims.exp <= now.timestamp() {
            debug!(exp = claims.exp, "token expired");
            return Err(AuthError::Invalid);
        }

        let id: UserId = claims.sub.parse().map_err(|e| {
            debug!(error = %e, "token subject is not an account id");
            AuthError::Invalid
        })?;

        let role: Role = claims.role.parse().map_err(|e| {
            debug!(error = %e, user_id = %id, "token carries unknown role");
            AuthError::Invalid
        })?;

        Ok(Principal::new(id, role, claims.name))
    }
}

/// Extracts the token from an `Authorization` header value.
///
/// An absent or blank header, or a `Bearer` scheme with nothing after it, is
/// `Missing`. Any other scheme, or a bare value without a scheme, is `Invalid`.
///
/// # Errors
///
/// See above.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AuthError::Missing);
    }

    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = rest.trim();
            if token.is_empty() {
                Err(AuthError::Missing)
            } else {
                Ok(token)
            }
        }
        None if value.eq_ignore_ascii_case("bearer") => Err(AuthError::Missing),
        _ => Err(AuthError::Invalid),
    }
}
