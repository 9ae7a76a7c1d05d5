//! Error types for the platform-access crate.
//!
//! - `AuthError`: the two outcomes of a failed identity resolution
//! - `TokenError`: why the credential verifier rejected or could not mint a token
//! - `PasswordError`: failures of the password hashing primitive

use std::fmt;

/// Failure to resolve a request's credential into a principal.
///
/// The HTTP layer maps both variants to `401 Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer material was presented.
    Missing,
    /// Bearer material was presented but is malformed, forged, or expired.
    Invalid,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "no token"),
            Self::Invalid => write!(f, "invalid token"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Errors from the signed-token primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is past its expiry.
    Expired,
    /// The signature does not match the configured key.
    BadSignature,
    /// The token could not be decoded or its claims are incomplete.
    Malformed { reason: String },
    /// A token could not be signed.
    SigningFailed { reason: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "token has expired"),
            Self::BadSignature => write!(f, "token signature mismatch"),
            Self::Malformed { reason } => write!(f, "malformed token: {reason}"),
            Self::SigningFailed { reason } => write!(f, "failed to sign token: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Errors from password hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// Hashing a new password failed.
    HashFailed { reason: String },
    /// The stored hash is not a valid PHC string.
    InvalidStoredHash { reason: String },
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HashFailed { reason } => write!(f, "failed to hash password: {reason}"),
            Self::InvalidStoredHash { reason } => {
                write!(f, "stored password hash is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for PasswordError {}
