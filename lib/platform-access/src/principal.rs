//! The authenticated identity attached to a request.

use crate::role::Role;
use schoolbook_core::UserId;
use serde::Serialize;

/// The identity and role attached to a request after credential verification.
///
/// A principal is rebuilt from verified claims on every request and is never
/// written back to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    id: UserId,
    role: Role,
    display_name: String,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub fn new(id: UserId, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            display_name: display_name.into(),
        }
    }

    /// Returns the account ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the principal's role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the name shown in the UI.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns true if the principal has admin access.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_constructor_values() {
        let principal = Principal::new(UserId::new(7), Role::Family, "Maria Rossi");
        assert_eq!(principal.id(), UserId::new(7));
        assert_eq!(principal.role(), Role::Family);
        assert_eq!(principal.display_name(), "Maria Rossi");
        assert!(!principal.is_admin());
    }

    #[test]
    fn serializes_with_role_name() {
        let principal = Principal::new(UserId::new(1), Role::Admin, "Office");
        let json = serde_json::to_value(&principal).expect("serialize");
        assert_eq!(json["id"], 1);
        assert_eq!(json["role"], "admin");
        assert_eq!(json["display_name"], "Office");
    }
}
