use super::{LineItem, NewLineItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of the stock movement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[serde(alias = "girdi")]
    Inbound,
    #[serde(alias = "çıktı", alias = "cikti")]
    Outbound,
}

impl TransactionType {
    /// Human-readable label used on the receipt.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Inbound => "Inbound",
            TransactionType::Outbound => "Outbound",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Inbound => write!(f, "inbound"),
            TransactionType::Outbound => write!(f, "outbound"),
        }
    }
}

/// Transaction header. `items` holds line item ids in caller order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub date: DateTime<Utc>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub store_name: String,
    /// Sum of the line totals, fixed at creation.
    pub total: f64,
    pub items: Vec<String>,
}

/// Caller-supplied input for a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub user: String,
    pub description: Option<String>,
    pub store_name: String,
    pub date: Option<DateTime<Utc>>,
    pub items: Vec<NewLineItem>,
}

impl Transaction {
    /// Builds the header over already-created line items, keeping their order.
    pub fn new(input: &NewTransaction, items: &[LineItem]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: input.kind,
            date: input.date.unwrap_or_else(Utc::now),
            user: input.user.clone(),
            description: input.description.clone(),
            store_name: input.store_name.clone(),
            total: items
                .iter()
                .fold(0.0, |total, item| total + item.total_price),
            items: items.iter().map(|item| item.id.clone()).collect(),
        }
    }
}

/// A transaction with its line item references resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionWithItems {
    pub transaction: Transaction,
    pub items: Vec<LineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(items: Vec<NewLineItem>) -> NewTransaction {
        NewTransaction {
            kind: TransactionType::Outbound,
            user: "alice".to_string(),
            description: None,
            store_name: "Corner Shop".to_string(),
            date: None,
            items,
        }
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        let new = input(vec![
            NewLineItem {
                product_name: "Widget".to_string(),
                quantity: 2.0,
                unit_price: 10.0,
            },
            NewLineItem {
                product_name: "Gadget".to_string(),
                quantity: 1.0,
                unit_price: 4.25,
            },
        ]);
        let items: Vec<LineItem> = new.items.iter().map(LineItem::new).collect();
        let transaction = Transaction::new(&new, &items);

        assert!((transaction.total - 24.25).abs() < 1e-9);
        assert_eq!(transaction.items, vec![items[0].id.clone(), items[1].id.clone()]);
    }

    #[test]
    fn empty_transaction_has_zero_total() {
        let transaction = Transaction::new(&input(vec![]), &[]);
        assert_eq!(transaction.total, 0.0);
        assert!(!transaction.total.is_sign_negative());
        assert!(transaction.items.is_empty());

        let json = serde_json::to_value(&transaction).unwrap();
        assert_eq!(json["total"].to_string(), "0.0");
    }

    #[test]
    fn storefront_type_labels_are_accepted() {
        let inbound: TransactionType = serde_json::from_str("\"girdi\"").unwrap();
        let outbound: TransactionType = serde_json::from_str("\"çıktı\"").unwrap();
        assert_eq!(inbound, TransactionType::Inbound);
        assert_eq!(outbound, TransactionType::Outbound);
        assert_eq!(serde_json::to_string(&outbound).unwrap(), "\"outbound\"");
    }
}
