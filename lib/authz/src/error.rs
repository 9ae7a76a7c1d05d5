//! Authorization error types.
//!
//! A refused permission is not an error: it is `Decision::Deny`. Errors here
//! mean the engine could not reach a decision at all.

use std::fmt;

/// Authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The family-link lookup failed or did not answer in time.
    StorageUnavailable {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageUnavailable { details } => {
                write!(f, "could not determine permission: {}", details)
            }
        }
    }
}

impl std::error::Error for AuthzError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_unavailable_display() {
        let err = AuthzError::StorageUnavailable {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("could not determine permission"));
        assert!(err.to_string().contains("connection refused"));
    }
}
