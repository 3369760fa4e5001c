use super::{MailRelay, OutboundMail, RelayError, RelayResponse};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;
use std::time::Duration;

pub struct SmtpRelay {
    config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(config: SmtpConfig) -> Result<Self, RelayError> {
        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(|e| {
                RelayError::Configuration(format!("Failed to create SMTP relay: {}", e))
            })?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if !config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.expose_secret().clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            config,
        })
    }

    fn build_message(&self, mail: &OutboundMail) -> Result<Message, RelayError> {
        let from_mailbox: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_email)
            .parse()
            .map_err(|e| RelayError::Configuration(format!("Invalid from address: {}", e)))?;

        let to_mailbox: Mailbox = mail
            .to
            .parse()
            .map_err(|e| RelayError::InvalidRecipient(format!("{}: {}", mail.to, e)))?;

        let content_type = ContentType::parse(&mail.attachment.content_type).map_err(|e| {
            RelayError::Configuration(format!("Invalid attachment content type: {}", e))
        })?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&mail.subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(mail.body_text.clone()),
                    )
                    .singlepart(
                        Attachment::new(mail.attachment.filename.clone())
                            .body(mail.attachment.bytes.clone(), content_type),
                    ),
            )
            .map_err(|e| RelayError::Configuration(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn send(&self, mail: &OutboundMail) -> Result<RelayResponse, RelayError> {
        let message = self.build_message(mail)?;

        let response = self.transport.send(message).await.map_err(|e| {
            if e.is_permanent() {
                RelayError::Rejected(e.to_string())
            } else {
                RelayError::Unavailable(e.to_string())
            }
        })?;

        let message_id = response.message().next().map(|s| s.to_string());

        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            attachment = %mail.attachment.filename,
            "Email accepted by SMTP relay"
        );

        Ok(RelayResponse { message_id })
    }

    async fn health_check(&self) -> Result<(), RelayError> {
        let reachable = self
            .transport
            .test_connection()
            .await
            .map_err(|e| RelayError::Unavailable(format!("SMTP connection test failed: {}", e)))?;

        if reachable {
            Ok(())
        } else {
            Err(RelayError::Unavailable(
                "SMTP relay did not answer NOOP".to_string(),
            ))
        }
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
