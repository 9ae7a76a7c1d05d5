//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys use
//! `__` as separator, e.g. `TOKEN__SECRET` or `MAIL__SMTP_HOST`.

use crate::mail::MailConfig;
use schoolbook_authz::PolicyConfig;
use schoolbook_platform_access::TokenConfig;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum number of pooled database connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Directory served for every path outside `/api`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// SQL file executed once when the `users` table is empty.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,

    /// Bearer token signing.
    pub token: TokenConfig,

    /// Access policy settings.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Outgoing mail. Parent notifications are disabled when absent.
    #[serde(default)]
    pub mail: Option<MailConfig>,

    /// Admin account created when the `users` table is empty.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// First admin account, for a fresh database.
#[derive(Clone, Deserialize)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    #[serde(default = "default_admin_name")]
    pub name: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_overrides(pairs: &[(&str, &str)]) -> Result<ServerConfig, config::ConfigError> {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = from_overrides(&[
            ("database_url", "postgres://localhost/school"),
            ("token.secret", "s3cret"),
        ])
        .expect("config");

        assert_eq!(config.port, 3000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert!(config.seed_path.is_none());
        assert_eq!(config.token.ttl_hours(), 12);
        assert_eq!(config.policy.lookup_timeout_ms, 2000);
        assert!(config.mail.is_none());
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn token_secret_is_required() {
        let result = from_overrides(&[("database_url", "postgres://localhost/school")]);
        assert!(result.is_err());
    }

    #[test]
    fn nested_sections_are_read() {
        let config = from_overrides(&[
            ("database_url", "postgres://localhost/school"),
            ("token.secret", "s3cret"),
            ("policy.lookup_timeout_ms", "250"),
            ("mail.username", "school@example.com"),
            ("mail.password", "app-password"),
            ("bootstrap_admin.username", "admin"),
            ("bootstrap_admin.password", "changeme"),
        ])
        .expect("config");

        assert_eq!(config.policy.lookup_timeout_ms, 250);
        let mail = config.mail.expect("mail section");
        assert_eq!(mail.smtp_host(), "smtp.gmail.com");
        assert_eq!(mail.smtp_port(), 465);
        let admin = config.bootstrap_admin.expect("bootstrap admin");
        assert_eq!(admin.name, "Administrator");
        assert!(!format!("{admin:?}").contains("changeme"));
    }
}
