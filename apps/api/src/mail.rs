//! Transactional email over SMTP.

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address '{0}'")]
    Address(String),

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::Address(addr) => AppError::Validation(format!("invalid email address '{addr}'")),
            other => AppError::Mail(other.to_string()),
        }
    }
}

/// A plain-text message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// SMTP mailer. The transport is built on first use and then reused.
pub struct SmtpMailer {
    host: String,
    port: u16,
    username: String,
    password: String,
    from: String,
    transport: OnceCell<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailer {
    pub fn new(host: String, port: u16, username: String, password: String, from: String) -> Self {
        Self {
            host,
            port,
            username,
            password,
            from,
            transport: OnceCell::new(),
        }
    }

    async fn transport(&self) -> Result<&AsyncSmtpTransport<Tokio1Executor>, MailError> {
        self.transport
            .get_or_try_init(|| async {
                info!("Initialising SMTP transport to {}:{}", self.host, self.port);
                let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
                    .port(self.port)
                    .credentials(Credentials::new(
                        self.username.clone(),
                        self.password.clone(),
                    ))
                    .build();
                Ok::<_, MailError>(transport)
            })
            .await
    }
}

fn mailbox(addr: &str) -> Result<Mailbox, MailError> {
    addr.parse::<Mailbox>()
        .map_err(|_| MailError::Address(addr.to_string()))
}

/// Builds the lettre message; kept apart from sending so it can be tested.
pub fn build_message(from: &str, email: &OutgoingEmail) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.clone())
        .header(ContentType::TEXT_PLAIN);
    if let Some(reply_to) = &email.reply_to {
        builder = builder.reply_to(mailbox(reply_to)?);
    }
    Ok(builder.body(email.body.clone())?)
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = build_message(&self.from, &email)?;
        self.transport().await?.send(message).await?;
        info!("Sent email '{}'", email.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str, reply_to: Option<&str>) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            reply_to: reply_to.map(String::from),
            subject: "Résultats Zélia".to_string(),
            body: "Bonjour".to_string(),
        }
    }

    #[test]
    fn test_build_message_sets_headers() {
        let message = build_message(
            "Zélia <contact@zelia.fr>",
            &email("lea@example.fr", Some("support@zelia.fr")),
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: lea@example.fr"));
        assert!(raw.contains("Reply-To: support@zelia.fr"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let err = build_message("contact@zelia.fr", &email("not an address", None)).unwrap_err();
        assert!(matches!(err, MailError::Address(_)));
        assert!(matches!(AppError::from(err), AppError::Validation(_)));
    }
}
