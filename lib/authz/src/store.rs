//! The storage read the engine depends on.

use crate::error::AuthzError;
use async_trait::async_trait;
use schoolbook_core::{Result, StudentId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A family account's relation to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyLink {
    /// The family account.
    pub user_id: UserId,
    /// The student the account may see.
    pub student_id: StudentId,
    /// Free-form relation, e.g. "mother" or "guardian".
    pub relation: String,
}

/// Read-only lookup of family links.
///
/// Implementations must map every storage failure to
/// `AuthzError::StorageUnavailable`; an empty set means "no links".
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Returns the students linked to a family account.
    async fn list_linked_students(
        &self,
        user_id: UserId,
    ) -> Result<BTreeSet<StudentId>, AuthzError>;
}
