pub mod mock;
pub mod smtp;

use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockRelay;
pub use smtp::SmtpRelay;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Relay unreachable: {0}")]
    Unavailable(String),

    #[error("Relay rejected message: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub attachment: MailAttachment,
}

/// Relay acknowledgement. Acceptance only means the relay took the message.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> Result<RelayResponse, RelayError>;
    async fn health_check(&self) -> Result<(), RelayError>;
    fn name(&self) -> &'static str;
}
