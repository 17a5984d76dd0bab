//! Outbound email via SMTP (lettre).
//!
//! SMTP is optional: when `SMTP_HOST` is unset the service runs in
//! simulated mode and sequence sends are only logged.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::MailError;

/// SMTP configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
}

impl MailConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMTP_HOST` is not set (mailer disabled).
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;

        let port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(std::env::var("SMTP_PASSWORD").unwrap_or_default());
        let from_address = std::env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| username.clone());

        Some(Self {
            host,
            port,
            username,
            password,
            from_address,
        })
    }
}

/// SMTP mailer. Blocking transport, so sends run on the blocking pool.
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Send one email. Blocking; callers wrap in `spawn_blocking`.
    pub fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let creds = Credentials::new(
            self.config.username.clone(),
            self.config.password.expose_secret().to_string(),
        );

        let transport = SmtpTransport::relay(&self.config.host)
            .map_err(|e| MailError::SendFailed(format!("SMTP relay error: {e}")))?
            .port(self.config.port)
            .credentials(creds)
            .build();

        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| MailError::InvalidAddress(format!("from: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::InvalidAddress(format!("to: {e}")))?)
            .subject(subject)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        transport
            .send(&email)
            .map_err(|e| MailError::SendFailed(e.to_string()))?;

        info!(to, subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_recipient_is_rejected_before_connecting() {
        let mailer = Mailer::new(MailConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: "user".into(),
            password: SecretString::from("pass"),
            from_address: "noreply@example.com".into(),
        });
        let err = mailer.send("not-an-address", "Hola", "cuerpo").unwrap_err();
        assert!(matches!(err, MailError::InvalidAddress(_)));
    }
}
