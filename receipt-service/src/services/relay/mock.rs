use super::{MailRelay, OutboundMail, RelayError, RelayResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-process relay used when SMTP is disabled and in tests.
pub struct MockRelay {
    accepting: AtomicBool,
    sent: Mutex<Vec<OutboundMail>>,
}

impl MockRelay {
    pub fn new(accepting: bool) -> Self {
        Self {
            accepting: AtomicBool::new(accepting),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutboundMail> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn send_count(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl MailRelay for MockRelay {
    async fn send(&self, mail: &OutboundMail) -> Result<RelayResponse, RelayError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(RelayError::Unavailable(
                "Mock relay is not accepting mail".to_string(),
            ));
        }

        let count = {
            let mut sent = self
                .sent
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            sent.push(mail.clone());
            sent.len()
        };

        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            attachment = %mail.attachment.filename,
            "[MOCK] Email would be sent"
        );

        Ok(RelayResponse {
            message_id: Some(format!("mock-email-{}", count)),
        })
    }

    async fn health_check(&self) -> Result<(), RelayError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
