//! Authentication and authorization for the schoolbook server.
//!
//! This module provides:
//! - Shared application state
//! - The bearer token extractor for Axum routes
//! - Login and current-principal routes
//!
//! # Authorization Model
//!
//! Every `/api` handler except login resolves the caller to a
//! [`Principal`] through [`RequireAuth`], then asks the policy engine via
//! [`AppState::authorize`] or [`AppState::scope`] before it touches storage.
//! Denials are logged with their reason; clients only ever see `403`.

pub mod middleware;
pub mod routes;

use crate::db::FamilyLinkRepository;
use crate::error::ApiError;
use crate::mail::Mailer;
use schoolbook_authz::{Action, Decision, PolicyConfig, PolicyEngine, ResourceRef, ScopeFilter};
use schoolbook_platform_access::{IdentityResolver, JwtCodec, Principal, TokenConfig};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

pub use middleware::RequireAuth;
pub use routes::{login, me};

/// Shared application state.
pub struct AppState {
    /// Database connection pool.
    pub db_pool: PgPool,
    /// Turns bearer tokens into principals.
    pub resolver: IdentityResolver,
    /// Decides every request.
    pub policy: PolicyEngine,
    /// Issues tokens at login.
    pub tokens: JwtCodec,
    /// Outgoing mail, when configured.
    pub mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        db_pool: PgPool,
        token_config: &TokenConfig,
        policy_config: &PolicyConfig,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Self {
        let tokens = JwtCodec::new(token_config);
        let resolver = IdentityResolver::new(Arc::new(tokens.clone()));
        let links = Arc::new(FamilyLinkRepository::new(db_pool.clone()));
        let policy = PolicyEngine::new(links, policy_config);

        Self {
            db_pool,
            resolver,
            policy,
            tokens,
            mailer,
        }
    }

    /// Fails with `Forbidden` unless `principal` may perform `action` on `resource`.
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: &ResourceRef,
    ) -> Result<(), ApiError> {
        match self.policy.authorize(principal, action, resource).await? {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                warn!(
                    user_id = %principal.id(),
                    role = %principal.role(),
                    action = %action.as_str(),
                    %resource,
                    %reason,
                    "access denied"
                );
                Err(ApiError::Forbidden { reason })
            }
        }
    }

    /// Returns the student scope for a collection read by `principal`.
    pub async fn scope(&self, principal: &Principal) -> Result<ScopeFilter, ApiError> {
        Ok(self.policy.scope_filter(principal).await?)
    }
}
