use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product line of a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    /// `quantity * unit_price`, fixed at creation.
    pub total_price: f64,
    /// Back-reference to the owning transaction, written in the link phase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied input for a line item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(input: &NewLineItem) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            product_name: input.product_name.clone(),
            quantity: input.quantity,
            unit_price: input.unit_price,
            total_price: input.quantity * input.unit_price,
            transaction_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.transaction_id.is_some()
    }
}
