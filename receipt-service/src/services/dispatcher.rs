use crate::services::metrics::record_delivery;
use crate::services::receipt::ReceiptRenderer;
use crate::services::relay::{MailAttachment, MailRelay, OutboundMail, RelayError};
use crate::services::transactions::TransactionStore;
use service_core::error::AppError;
use std::sync::Arc;

pub const RECEIPT_CONTENT_TYPE: &str = "application/pdf";

/// Outcome of a successful hand-off to the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub transaction_id: String,
    pub recipient: String,
    pub attachment_name: String,
    pub message_id: Option<String>,
}

/// Fetches a transaction, renders it and mails the receipt. No retries.
#[derive(Clone)]
pub struct ReceiptDispatcher {
    store: TransactionStore,
    renderer: ReceiptRenderer,
    relay: Arc<dyn MailRelay>,
    subject: String,
    body: String,
}

pub fn attachment_name(transaction_id: &str) -> String {
    format!("receipt-{}.pdf", transaction_id)
}

impl ReceiptDispatcher {
    pub fn new(
        store: TransactionStore,
        renderer: ReceiptRenderer,
        relay: Arc<dyn MailRelay>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            store,
            renderer,
            relay,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Renders the receipt for `transaction_id` without sending it.
    pub async fn render(&self, transaction_id: &str) -> Result<Vec<u8>, AppError> {
        let receipt = self.store.get_transaction(transaction_id).await?;
        self.renderer.render(&receipt)
    }

    pub async fn send_receipt(
        &self,
        transaction_id: &str,
        recipient: &str,
    ) -> Result<DeliveryReceipt, AppError> {
        let document = self.render(transaction_id).await?;
        let attachment_name = attachment_name(transaction_id);

        let mail = OutboundMail {
            to: recipient.to_string(),
            subject: self.subject.clone(),
            body_text: self.body.clone(),
            attachment: MailAttachment {
                filename: attachment_name.clone(),
                content_type: RECEIPT_CONTENT_TYPE.to_string(),
                bytes: document,
            },
        };

        match self.relay.send(&mail).await {
            Ok(response) => {
                record_delivery(self.relay.name(), "accepted");
                tracing::info!(
                    transaction_id = %transaction_id,
                    recipient = %recipient,
                    relay = self.relay.name(),
                    "Receipt handed to relay"
                );
                Ok(DeliveryReceipt {
                    transaction_id: transaction_id.to_string(),
                    recipient: recipient.to_string(),
                    attachment_name,
                    message_id: response.message_id,
                })
            }
            Err(e) => {
                record_delivery(self.relay.name(), "failed");
                tracing::error!(
                    transaction_id = %transaction_id,
                    recipient = %recipient,
                    relay = self.relay.name(),
                    error = %e,
                    "Failed to deliver receipt"
                );
                Err(delivery_error(e))
            }
        }
    }
}

fn delivery_error(err: RelayError) -> AppError {
    AppError::DeliveryError(anyhow::Error::new(err))
}
