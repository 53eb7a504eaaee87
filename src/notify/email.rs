use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AlertChannel, Channel};
use crate::error::{DashboardError, Result};

fn default_smtp_port() -> u16 {
    587
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub server: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Also used as the sender address.
    pub username: String,
    pub password: String,
}

/// Email over an authenticated STARTTLS SMTP relay.
pub struct SmtpEmail {
    config: SmtpConfig,
}

impl SmtpEmail {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn failed(reason: impl Into<String>) -> DashboardError {
        DashboardError::NotificationFailed {
            channel: Channel::Email,
            reason: reason.into(),
        }
    }

    /// Build the message without sending it.
    pub fn compose(&self, destination: &str, subject: &str, message: &str) -> Result<Message> {
        let to: Mailbox = destination
            .trim()
            .parse()
            .map_err(|_| DashboardError::InvalidDestination {
                channel: Channel::Email,
                destination: destination.to_string(),
            })?;
        let from: Mailbox = self
            .config
            .username
            .parse()
            .map_err(|e| Self::failed(format!("sender {:?}: {}", self.config.username, e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.to_string())
            .map_err(|e| Self::failed(format!("building message: {}", e)))
    }
}

impl AlertChannel for SmtpEmail {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn send(&self, destination: &str, subject: &str, message: &str) -> Result<()> {
        let email = self.compose(destination, subject, message)?;

        debug!(server = %self.config.server, port = self.config.port, "sending email");
        let mailer = SmtpTransport::starttls_relay(&self.config.server)
            .map_err(|e| Self::failed(format!("SMTP relay {}: {}", self.config.server, e)))?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .build();

        mailer
            .send(&email)
            .map_err(|e| Self::failed(format!("SMTP send: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> SmtpEmail {
        SmtpEmail::new(SmtpConfig {
            server: "127.0.0.1".into(),
            port: 1,
            username: "alerts@example.com".into(),
            password: "pw".into(),
        })
    }

    #[test]
    fn composes_plain_text_message() {
        let msg = channel()
            .compose("user@example.org", "Test Alert", "flood warning")
            .unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("To: user@example.org"));
        assert!(raw.contains("From: alerts@example.com"));
        assert!(raw.contains("Subject: Test Alert"));
        assert!(raw.contains("flood warning"));
    }

    #[test]
    fn invalid_address_is_rejected() {
        let err = channel().send("not an email", "s", "m").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InvalidDestination { channel: Channel::Email, .. }
        ));
    }

    #[test]
    fn unreachable_server_is_notification_failure() {
        let err = channel().send("user@example.org", "s", "m").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::NotificationFailed { channel: Channel::Email, .. }
        ));
    }
}
