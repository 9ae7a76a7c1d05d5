//! Platform access and identity for schoolbook.
//!
//! This crate provides:
//! - The closed set of account roles (`Role`)
//! - The per-request identity (`Principal`)
//! - Signed bearer tokens (`JwtCodec`, behind the `CredentialVerifier` trait)
//! - Identity resolution from an `Authorization` header (`IdentityResolver`)
//! - Password hashing
//!
//! # Example
//!
//! ```
//! use schoolbook_core::UserId;
//! use schoolbook_platform_access::{IdentityResolver, JwtCodec, Role, TokenConfig};
//! use std::sync::Arc;
//!
//! let codec = JwtCodec::new(&TokenConfig::new("dev-secret"));
//! let token = codec
//!     .issue(UserId::new(3), "bianchi", Role::Teacher, "Luca Bianchi")
//!     .unwrap();
//!
//! let resolver = IdentityResolver::new(Arc::new(codec));
//! let principal = resolver.resolve(Some(format!("Bearer {token}").as_str())).unwrap();
//! assert_eq!(principal.role(), Role::Teacher);
//! ```

pub mod error;
pub mod password;
pub mod principal;
pub mod resolver;
pub mod role;
pub mod token;

// Re-export main types at crate root
pub use error::{AuthError, PasswordError, TokenError};
pub use password::{hash_password, verify_password};
pub use principal::Principal;
pub use resolver::{IdentityResolver, bearer_token};
pub use role::{Role, UnknownRole};
pub use token::{Claims, CredentialVerifier, JwtCodec, TokenConfig};
