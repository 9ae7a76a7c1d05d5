//! The access policy engine.

use crate::error::AuthzError;
use crate::scope::ScopeFilter;
use crate::store::LinkStore;
use crate::types::{Action, Decision, DenyReason, ResourceRef, ResourceType};
use schoolbook_core::{Result, StudentId, UserId};
use schoolbook_platform_access::{Principal, Role};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Policy engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Upper bound on the family-link lookup, in milliseconds.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
}

fn default_lookup_timeout_ms() -> u64 {
    2000
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_ms: default_lookup_timeout_ms(),
        }
    }
}

/// What the role table says before any ownership is considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoleRule {
    /// Settled by role alone.
    Settled(Decision),
    /// Allowed only if the resource's owner student is linked to the principal.
    RequiresLink,
}

/// The role decision table, evaluated top to bottom.
fn role_rule(role: Role, action: Action, resource_type: &ResourceType) -> RoleRule {
    use ResourceType as T;

    match (role, action, resource_type) {
        // Malformed input fails closed for every role.
        (_, _, T::Unrecognized(_)) => RoleRule::Settled(Decision::Deny(DenyReason::UnknownPolicy)),

        (Role::Admin, _, _) => RoleRule::Settled(Decision::Allow),

        (Role::Teacher, _, T::Student | T::Grade | T::Announcement) => {
            RoleRule::Settled(Decision::Allow)
        }
        (Role::Teacher, _, T::UserAccount | T::FamilyLink) => {
            RoleRule::Settled(Decision::Deny(DenyReason::InsufficientRole))
        }

        (Role::Family, Action::Write, _) => {
            RoleRule::Settled(Decision::Deny(DenyReason::InsufficientRole))
        }
        (Role::Family, Action::Read, _) => RoleRule::RequiresLink,
    }
}

/// Decides whether a principal may act on a resource.
///
/// The engine holds no mutable state; clones share the link store and can be
/// used from any number of concurrent requests.
#[derive(Clone)]
pub struct PolicyEngine {
    links: Arc<dyn LinkStore>,
    lookup_timeout: Duration,
}

impl PolicyEngine {
    /// Creates an engine that reads family links from `links`.
    #[must_use]
    pub fn new(links: Arc<dyn LinkStore>, config: &PolicyConfig) -> Self {
        Self {
            links,
            lookup_timeout: Duration::from_millis(config.lookup_timeout_ms),
        }
    }

    /// Decides whether `principal` may perform `action` on `resource`.
    ///
    /// Denial is a normal outcome. The family-link lookup is the only storage
    /// access and happens at most once, only for family reads.
    ///
    /// # Errors
    ///
    /// Returns `AuthzError::StorageUnavailable` if the link lookup fails or
    /// times out. A lookup failure is never reported as a denial.
    #[instrument(
        skip(self, principal, resource),
        fields(user_id = %principal.id(), role = %principal.role(), resource = %resource)
    )]
    pub async fn authorize(
        &self,
        principal: &Principal,
        action: Action,
        resource: &ResourceRef,
    ) -> Result<Decision, AuthzError> {
        let decision = match role_rule(principal.role(), action, &resource.resource_type) {
            RoleRule::Settled(decision) => decision,
            RoleRule::RequiresLink => match resource.owner_student() {
                // Nothing to be linked to: deny without a lookup.
                None => Decision::Deny(DenyReason::NotOwner),
                Some(owner) => {
                    let linked = self.linked_students(principal.id()).await?;
                    if linked.contains(&owner) {
                        Decision::Allow
                    } else {
                        Decision::Deny(DenyReason::NotOwner)
                    }
                }
            },
        };

        debug!(%decision, "access decision");
        Ok(decision)
    }

    /// Returns the filter a collection read must apply for `principal`.
    ///
    /// # Errors
    ///
    /// Returns `AuthzError::StorageUnavailable` if the link lookup fails or
    /// times out.
    #[instrument(skip(self, principal), fields(user_id = %principal.id(), role = %principal.role()))]
    pub async fn scope_filter(
        &self,
        principal: &Principal,
    ) -> Result<ScopeFilter, AuthzError> {
        match principal.role() {
            Role::Admin | Role::Teacher => Ok(ScopeFilter::Unrestricted),
            Role::Family => {
                let linked = self.linked_students(principal.id()).await?;
                debug!(count = linked.len(), "family scope");
                Ok(ScopeFilter::Students(linked))
            }
        }
    }

    async fn linked_students(
        &self,
        user_id: UserId,
    ) -> Result<BTreeSet<StudentId>, AuthzError> {
        match tokio::time::timeout(
            self.lookup_timeout,
            self.links.list_linked_students(user_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(AuthzError::StorageUnavailable {
                details: format!(
                    "family link lookup timed out after {} ms",
                    self.lookup_timeout.as_millis()
                ),
            }
            .into()),
        }
    }
}
