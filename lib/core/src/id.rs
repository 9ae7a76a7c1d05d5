//! Strongly-typed ID types for domain entities.
//!
//! Every entity is keyed by a database-assigned `BIGSERIAL`, so IDs wrap an
//! `i64`. The newtypes keep a student ID from ever being passed where a user
//! ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed ID wrapper around an `i64` key.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an ID from a raw database key.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw database key.
            #[must_use]
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// Returns the label used in log fields and resource names.
            #[must_use]
            pub const fn label() -> &'static str {
                $label
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self).map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    reason: e.to_string(),
                })
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a user account (admin, teacher, or family member).
    UserId,
    "user"
);

define_id!(
    /// Unique identifier for a student record.
    StudentId,
    "student"
);

define_id!(
    /// Unique identifier for a single grade entry.
    GradeId,
    "grade"
);

define_id!(
    /// Unique identifier for an announcement.
    AnnouncementId,
    "announcement"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_key() {
        assert_eq!(StudentId::new(12).to_string(), "12");
    }

    #[test]
    fn parse_accepts_surrounding_whitespace() {
        let id: UserId = " 7 ".parse().expect("should parse");
        assert_eq!(id.get(), 7);
    }

    #[test]
    fn parse_rejects_non_numeric() {
        let result: Result<StudentId, _> = "abc".parse();
        let err = result.unwrap_err();
        assert_eq!(err.id_type, "StudentId");
    }

    #[test]
    fn ids_order_by_key() {
        let mut ids = vec![StudentId::new(9), StudentId::new(2), StudentId::new(5)];
        ids.sort();
        assert_eq!(ids, vec![StudentId::new(2), StudentId::new(5), StudentId::new(9)]);
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&GradeId::new(3)).expect("serialize");
        assert_eq!(json, "3");
        let parsed: GradeId = serde_json::from_str("3").expect("deserialize");
        assert_eq!(parsed, GradeId::new(3));
    }
}
