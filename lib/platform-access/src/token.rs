//! Signed bearer tokens.
//!
//! `JwtCodec` mints tokens at login and verifies them on every request.
//! Verification goes through the [`CredentialVerifier`] trait so the
//! resolver can be exercised without real signatures.

use crate::error::TokenError;
use crate::role::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use schoolbook_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID, as a decimal string.
    pub sub: String,
    /// Login name.
    pub username: String,
    /// Role name; parsed into [`Role`] by the resolver.
    pub role: String,
    /// Display name.
    pub name: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Verifies a bearer token and returns its claims.
pub trait CredentialVerifier: Send + Sync {
    /// Checks structure, signature, and expiry of `token`.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] describing why the token was rejected.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// Token signing configuration.
#[derive(Clone, Deserialize)]
pub struct TokenConfig {
    /// Shared HMAC secret.
    secret: String,
    /// Lifetime of issued tokens in hours.
    #[serde(default = "default_ttl_hours")]
    ttl_hours: i64,
}

fn default_ttl_hours() -> i64 {
    12
}

impl TokenConfig {
    /// Creates a configuration with the default lifetime.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl_hours: default_ttl_hours(),
        }
    }

    /// Sets the token lifetime.
    #[must_use]
    pub fn with_ttl_hours(mut self, ttl_hours: i64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }

    /// Returns the token lifetime in hours.
    #[must_use]
    pub fn ttl_hours(&self) -> i64 {
        self.ttl_hours
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// HS256 token codec.
#[derive(Clone)]
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtCodec {
    /// Creates a codec from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; a token is dead the second it expires.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            ttl: Duration::hours(config.ttl_hours),
        }
    }

    /// Mints a token for an account.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::SigningFailed` if the claims cannot be encoded.
    pub fn issue(
        &self,
        id: UserId,
        username: &str,
        role: Role,
        name: &str,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: id.to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.encode(&claims)
    }

    /// Signs an arbitrary set of claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::SigningFailed` if the claims cannot be encoded.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key).map_err(
            |e| TokenError::SigningFailed {
                reason: e.to_string(),
            },
        )
    }
}

impl CredentialVerifier for JwtCodec {
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed {
                    reason: e.to_string(),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> JwtCodec {
        JwtCodec::new(&TokenConfig::new(secret))
    }

    fn claims_expiring_at(exp: i64) -> Claims {
        Claims {
            sub: "7".to_string(),
            username: "rossi".to_string(),
            role: "family".to_string(),
            name: "Maria Rossi".to_string(),
            iat: exp - 3600,
            exp,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let codec = codec("test-secret");
        let token = codec
            .issue(UserId::new(7), "rossi", Role::Family, "Maria Rossi")
            .expect("issue");

        let claims = codec.verify(&token).expect("verify");
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "family");
        assert_eq!(claims.name, "Maria Rossi");
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn ttl_is_configurable() {
        let codec = JwtCodec::new(&TokenConfig::new("s").with_ttl_hours(1));
        let token = codec
            .issue(UserId::new(1), "admin", Role::Admin, "Office")
            .expect("issue");
        let claims = codec.verify(&token).expect("verify");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_bad_signature() {
        let token = codec("one")
            .issue(UserId::new(1), "admin", Role::Admin, "Office")
            .expect("issue");
        assert_eq!(codec("two").verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec("test-secret");
        let token = codec
            .encode(&claims_expiring_at(Utc::now().timestamp() - 10))
            .expect("encode");
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        let result = codec("test-secret").verify("not.a.token");
        assert!(matches!(result, Err(TokenError::Malformed { .. })));
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", TokenConfig::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
    }
}
