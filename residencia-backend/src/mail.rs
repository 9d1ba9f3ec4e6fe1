use async_trait::async_trait;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("invalid recipient `{0}`")]
    InvalidRecipient(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Outgoing mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    #[must_use]
    pub const fn new(sender: String) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        if !crate::validation::is_email(&email.to) {
            return Err(MailError::InvalidRecipient(email.to));
        }
        info!(
            from = self.sender,
            to = email.to,
            subject = email.subject,
            "{}",
            email.body
        );
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Keeps sent messages in memory.
    #[derive(Debug, Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<Email>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: Email) -> Result<(), MailError> {
            self.sent
                .lock()
                .map_err(|err| MailError::Delivery(err.to_string()))?
                .push(email);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_rejects_malformed_recipients() {
        let mailer = LogMailer::new("Residencia <notificaciones@residencia.com>".to_owned());
        let email = Email {
            to: "not-an-address".to_owned(),
            subject: "Stock".to_owned(),
            body: String::new(),
        };
        assert!(matches!(
            mailer.send(email).await,
            Err(MailError::InvalidRecipient(_))
        ));
    }

    #[tokio::test]
    async fn log_mailer_accepts_valid_recipients() {
        let mailer = LogMailer::new("noreply@residencia.com".to_owned());
        let email = Email {
            to: "enfermeria@residencia.com".to_owned(),
            subject: "Stock".to_owned(),
            body: "ok".to_owned(),
        };
        assert!(mailer.send(email).await.is_ok());
    }
}
