//! Access policy engine for schoolbook.
//!
//! Given a resolved [`Principal`](schoolbook_platform_access::Principal), an
//! [`Action`], and a [`ResourceRef`], the [`PolicyEngine`] returns a
//! [`Decision`]. All role rules live in one table; the only storage access is
//! the family-link lookup behind the [`LinkStore`] trait.

mod engine;
mod error;
mod scope;
mod store;
mod types;

pub use engine::{PolicyConfig, PolicyEngine};
pub use error::AuthzError;
pub use scope::ScopeFilter;
pub use store::{FamilyLink, LinkStore};
pub use types::{Action, Decision, DenyReason, ResourceRef, ResourceType};
