//! Role types for platform access control.
//!
//! Every account carries exactly one role. The set is closed: a role name
//! that does not map onto one of these variants is rejected when a
//! credential is resolved, never carried forward as a string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role attached to an account and to every principal resolved from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// School office staff with full access.
    Admin,
    /// Teaching staff: manage students, grades, and announcements.
    Teacher,
    /// Parent or guardian: read-only access to their linked students.
    Family,
}

impl Role {
    /// Returns the canonical lowercase name stored in tokens and the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Family => "family",
        }
    }

    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a role name outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    /// Parses a role name case-insensitively.
    ///
    /// `parent` is accepted as a legacy spelling of `family`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "teacher" => Ok(Self::Teacher),
            "family" | "parent" => Ok(Self::Family),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admin_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Teacher.is_admin());
        assert!(!Role::Family.is_admin());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" Teacher ".parse::<Role>(), Ok(Role::Teacher));
    }

    #[test]
    fn parent_is_family() {
        assert_eq!("parent".parse::<Role>(), Ok(Role::Family));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "janitor".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("janitor".to_string()));
        assert!(err.to_string().contains("janitor"));
    }

    #[test]
    fn role_serialization_format() {
        let json = serde_json::to_string(&Role::Family).expect("serialize");
        assert_eq!(json, "\"family\"");

        let parsed: Role = serde_json::from_str("\"teacher\"").expect("deserialize");
        assert_eq!(parsed, Role::Teacher);
    }

    #[test]
    fn display_matches_storage_name() {
        for role in [Role::Admin, Role::Teacher, Role::Family] {
            assert_eq!(role.to_string(), role.as_str());
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }
}
