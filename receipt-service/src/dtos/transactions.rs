use crate::models::{
    LineItem, NewLineItem, NewTransaction, Transaction, TransactionType, TransactionWithItems,
};
use crate::services::DeliveryReceipt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub user: String,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Store name cannot be empty"))]
    pub store_name: String,
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    #[validate(length(min = 1, message = "Product name cannot be empty"))]
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl From<CreateTransactionRequest> for NewTransaction {
    fn from(req: CreateTransactionRequest) -> Self {
        Self {
            kind: req.kind,
            user: req.user,
            description: req.description,
            store_name: req.store_name,
            date: req.date,
            items: req
                .items
                .into_iter()
                .map(|item| NewLineItem {
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendReceiptRequest {
    #[validate(length(min = 1, message = "Transaction id cannot be empty"))]
    pub id: String,
    #[validate(email(message = "Invalid recipient address"))]
    pub recipient_address: String,
}

/// Transaction header as returned by create: items are ids only.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub store_name: String,
    pub total: f64,
    pub items: Vec<String>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            kind: tx.kind,
            date: tx.date.to_rfc3339(),
            user: tx.user,
            description: tx.description,
            store_name: tx.store_name,
            total: tx.total,
            items: tx.items,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub id: String,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub transaction_id: Option<String>,
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            id: item.id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            transaction_id: item.transaction_id,
        }
    }
}

/// Transaction with line items expanded.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetailResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub store_name: String,
    pub total: f64,
    pub items: Vec<LineItemResponse>,
}

impl From<TransactionWithItems> for TransactionDetailResponse {
    fn from(expanded: TransactionWithItems) -> Self {
        let tx = expanded.transaction;
        Self {
            id: tx.id,
            kind: tx.kind,
            date: tx.date.to_rfc3339(),
            user: tx.user,
            description: tx.description,
            store_name: tx.store_name,
            total: tx.total,
            items: expanded.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceiptResponse {
    pub success: bool,
    pub message: String,
    pub transaction_id: String,
    pub recipient_address: String,
    pub attachment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl From<DeliveryReceipt> for SendReceiptResponse {
    fn from(delivery: DeliveryReceipt) -> Self {
        Self {
            success: true,
            message: "Receipt accepted for delivery".to_string(),
            transaction_id: delivery.transaction_id,
            recipient_address: delivery.recipient,
            attachment: delivery.attachment_name,
            message_id: delivery.message_id,
        }
    }
}
