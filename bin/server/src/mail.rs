//! Outgoing mail to student families.

use async_trait::async_trait;
use mail_builder::MessageBuilder;
use mail_send::SmtpClientBuilder;
use rootcause::prelude::Report;
use serde::Deserialize;
use std::fmt;
use tracing::{debug, instrument};

/// Subject used when a request does not supply one.
pub const DEFAULT_SUBJECT: &str = "Comunicazione scuola";

/// SMTP settings.
#[derive(Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_smtp_host")]
    smtp_host: String,
    #[serde(default = "default_smtp_port")]
    smtp_port: u16,
    /// Login, also used as the sender address.
    username: String,
    password: String,
    #[serde(default = "default_from_name")]
    from_name: String,
    #[serde(default = "default_implicit_tls")]
    implicit_tls: bool,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_from_name() -> String {
    "Scuola".to_string()
}

fn default_implicit_tls() -> bool {
    true
}

impl MailConfig {
    /// Creates a config with the default host, port and sender name.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: username.into(),
            password: password.into(),
            from_name: default_from_name(),
            implicit_tls: default_implicit_tls(),
        }
    }

    pub fn smtp_host(&self) -> &str {
        &self.smtp_host
    }

    pub fn smtp_port(&self) -> u16 {
        self.smtp_port
    }

    pub fn from_name(&self) -> &str {
        &self.from_name
    }

    pub fn from_address(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_name", &self.from_name)
            .field("implicit_tls", &self.implicit_tls)
            .finish()
    }
}

/// Errors from sending mail.
#[derive(Debug)]
pub enum MailError {
    /// Could not connect or authenticate to the SMTP server.
    ConnectFailed { reason: String },
    /// The server rejected the message.
    SendFailed { reason: String },
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed { reason } => write!(f, "SMTP connection failed: {reason}"),
            Self::SendFailed { reason } => write!(f, "failed to send email: {reason}"),
        }
    }
}

impl std::error::Error for MailError {}

/// A plain-text message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// Builds a message, falling back to the default subject and an empty body.
    pub fn new(to: impl Into<String>, subject: Option<String>, body: Option<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            body: body.unwrap_or_default(),
        }
    }
}

/// Delivers outgoing mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), Report<MailError>>;
}

/// Sends mail through an authenticated SMTP server.
pub struct SmtpMailer {
    config: MailConfig,
}

impl SmtpMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

/// Builds the MIME message for `mail` with the configured sender.
pub fn build_message<'a>(config: &'a MailConfig, mail: &'a OutgoingMail) -> MessageBuilder<'a> {
    MessageBuilder::new()
        .from((config.from_name(), config.from_address()))
        .to(mail.to.as_str())
        .subject(mail.subject.as_str())
        .text_body(mail.body.as_str())
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, mail), fields(to = %mail.to))]
    async fn send(&self, mail: &OutgoingMail) -> Result<(), Report<MailError>> {
        let config = &self.config;
        let mut client = SmtpClientBuilder::new(config.smtp_host.as_str(), config.smtp_port)
            .implicit_tls(config.implicit_tls)
            .credentials((config.username.as_str(), config.password.as_str()))
            .connect()
            .await
            .map_err(|e| MailError::ConnectFailed {
                reason: e.to_string(),
            })?;

        client
            .send(build_message(config, mail))
            .await
            .map_err(|e| MailError::SendFailed {
                reason: e.to_string(),
            })?;

        debug!("mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_subject_uses_default() {
        let mail = OutgoingMail::new("parent@example.com", None, None);
        assert_eq!(mail.subject, DEFAULT_SUBJECT);
        assert_eq!(mail.body, "");

        let blank = OutgoingMail::new("parent@example.com", Some("  ".into()), None);
        assert_eq!(blank.subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn message_carries_sender_and_recipient() {
        let config = MailConfig::new("school@example.com", "app-password");
        let mail = OutgoingMail::new(
            "parent@example.com",
            Some("Colloquio".into()),
            Some("Buongiorno".into()),
        );

        let raw = build_message(&config, &mail)
            .write_to_string()
            .expect("render message");

        assert!(raw.contains("Scuola"));
        assert!(raw.contains("school@example.com"));
        assert!(raw.contains("parent@example.com"));
        assert!(raw.contains("Subject: Colloquio"));
        assert!(raw.contains("Buongiorno"));
    }

    #[test]
    fn debug_redacts_password() {
        let config = MailConfig::new("school@example.com", "app-password");
        let debug = format!("{config:?}");
        assert!(!debug.contains("app-password"));
        assert!(debug.contains("smtp.gmail.com"));
    }
}
