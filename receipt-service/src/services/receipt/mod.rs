//! Receipt document rendering.

pub mod pdf;

use crate::models::TransactionWithItems;
use crate::services::metrics::record_document_rendered;
use self::pdf::{Block, PdfWriter};
use service_core::error::AppError;

pub const RECEIPT_TITLE: &str = "Product Transaction Receipt";
const STORE_PLACEHOLDER: &str = "Store";
const USER_PLACEHOLDER: &str = "-";
const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Renders expanded transactions into PDF receipts.
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    currency: String,
}

impl ReceiptRenderer {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    /// Renders the whole receipt and returns the finished document.
    ///
    /// Output depends only on the input, so rendering the same transaction
    /// twice yields identical bytes.
    pub fn render(&self, receipt: &TransactionWithItems) -> Result<Vec<u8>, AppError> {
        let mut writer = PdfWriter::new();
        for block in self.blocks(receipt) {
            writer.push(block);
        }

        let bytes = writer.finish().map_err(|e| {
            tracing::error!(
                transaction_id = %receipt.transaction.id,
                error = %e,
                "Failed to render receipt"
            );
            AppError::GenerationError(anyhow::anyhow!(e))
        })?;

        record_document_rendered();
        tracing::debug!(
            transaction_id = %receipt.transaction.id,
            size = bytes.len(),
            "Receipt rendered"
        );
        Ok(bytes)
    }

    /// The receipt content, top to bottom.
    pub fn blocks(&self, receipt: &TransactionWithItems) -> Vec<Block> {
        let tx = &receipt.transaction;
        let store_name = match tx.store_name.trim() {
            "" => STORE_PLACEHOLDER,
            name => name,
        };
        let user = match tx.user.trim() {
            "" => USER_PLACEHOLDER,
            user => user,
        };

        let mut blocks = vec![
            Block::centered(store_name, 20),
            Block::Gap(6),
            Block::centered(RECEIPT_TITLE, 14),
            Block::Gap(12),
            Block::line(format!("Date: {}", tx.date.format(DATE_FORMAT))),
            Block::line(format!("Type: {}", tx.kind.label())),
            Block::Gap(12),
            Block::line("Products:"),
        ];

        blocks.extend(receipt.items.iter().enumerate().map(|(index, item)| {
            Block::line(format!(
                "{}. {}  {} x {} = {}",
                index + 1,
                item.product_name,
                format_quantity(item.quantity),
                self.money(item.unit_price),
                self.money(item.total_price),
            ))
        }));

        blocks.push(Block::Gap(12));
        blocks.push(Block::line(format!("Total: {}", self.money(tx.total))));
        blocks.push(Block::Gap(12));
        blocks.push(Block::line(format!("Issued by: {}", user)));

        if let Some(description) = tx.description.as_deref().filter(|d| !d.trim().is_empty()) {
            blocks.push(Block::line(format!("Description: {}", description)));
        }

        blocks
    }

    fn money(&self, amount: f64) -> String {
        // Negative zero would print as "-0.00".
        let amount = if amount == 0.0 { 0.0 } else { amount };
        format!("{:.2} {}", amount, self.currency)
    }
}

fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{:.0}", quantity)
    } else {
        quantity.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, NewLineItem, NewTransaction, Transaction, TransactionType};
    use chrono::{TimeZone, Utc};

    fn receipt(description: Option<&str>, items: &[(&str, f64, f64)]) -> TransactionWithItems {
        let input = NewTransaction {
            kind: TransactionType::Outbound,
            user: "alice".to_string(),
            description: description.map(str::to_string),
            store_name: "Corner Shop".to_string(),
            date: Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()),
            items: items
                .iter()
                .map(|(name, quantity, unit_price)| NewLineItem {
                    product_name: name.to_string(),
                    quantity: *quantity,
                    unit_price: *unit_price,
                })
                .collect(),
        };
        let items: Vec<LineItem> = input.items.iter().map(LineItem::new).collect();
        let transaction = Transaction::new(&input, &items);
        TransactionWithItems { transaction, items }
    }

    fn text_of(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|block| match block {
                Block::Text { text, .. } => Some(text.clone()),
                Block::Gap(_) => None,
            })
            .collect()
    }

    #[test]
    fn blocks_follow_receipt_layout() {
        let renderer = ReceiptRenderer::new("TL");
        let lines = text_of(&renderer.blocks(&receipt(
            Some("weekly restock"),
            &[("Widget", 2.0, 10.0), ("Gadget", 1.5, 4.0)],
        )));

        assert_eq!(
            lines,
            vec![
                "Corner Shop",
                RECEIPT_TITLE,
                "Date: 05.03.2024 14:30",
                "Type: Outbound",
                "Products:",
                "1. Widget  2 x 10.00 TL = 20.00 TL",
                "2. Gadget  1.5 x 4.00 TL = 6.00 TL",
                "Total: 26.00 TL",
                "Issued by: alice",
                "Description: weekly restock",
            ]
        );
    }

    #[test]
    fn empty_description_is_omitted_and_placeholders_apply() {
        let renderer = ReceiptRenderer::new("TL");
        let mut input = receipt(Some("  "), &[]);
        input.transaction.store_name = String::new();
        input.transaction.user = String::new();

        let lines = text_of(&renderer.blocks(&input));

        assert_eq!(lines.first().map(String::as_str), Some("Store"));
        assert!(lines.contains(&"Issued by: -".to_string()));
        assert!(lines.contains(&"Total: 0.00 TL".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Description")));
    }

    #[test]
    fn zero_item_receipt_prints_positive_zero_total() {
        let renderer = ReceiptRenderer::new("TL");
        let input = receipt(None, &[]);
        assert!(!input.transaction.total.is_sign_negative());

        let lines = text_of(&renderer.blocks(&input));
        assert!(lines.contains(&"Total: 0.00 TL".to_string()));
    }

    #[test]
    fn negative_zero_amounts_print_without_sign() {
        let renderer = ReceiptRenderer::new("TL");
        let mut input = receipt(None, &[("Sample", 0.0, -3.0)]);
        input.transaction.total = -0.0;

        let lines = text_of(&renderer.blocks(&input));
        assert!(lines.contains(&"1. Sample  0 x -3.00 TL = 0.00 TL".to_string()));
        assert!(lines.contains(&"Total: 0.00 TL".to_string()));
    }

    #[test]
    fn centered_store_name_is_large() {
        let renderer = ReceiptRenderer::new("TL");
        let blocks = renderer.blocks(&receipt(None, &[]));
        assert_eq!(blocks[0], Block::centered("Corner Shop", 20));
    }

    #[test]
    fn rendering_is_byte_identical_across_calls() {
        let renderer = ReceiptRenderer::new("TL");
        let input = receipt(Some("restock"), &[("Widget", 2.0, 10.0)]);

        let first = renderer.render(&input).unwrap();
        let second = renderer.render(&input).unwrap();

        assert!(first.starts_with(b"%PDF"));
        assert_eq!(first, second);
    }

    #[test]
    fn many_items_still_render() {
        let renderer = ReceiptRenderer::new("TL");
        let items: Vec<(String, f64, f64)> = (0..150)
            .map(|i| (format!("Product {}", i), 1.0, i as f64))
            .collect();
        let items: Vec<(&str, f64, f64)> = items
            .iter()
            .map(|(name, q, p)| (name.as_str(), *q, *p))
            .collect();

        let bytes = renderer.render(&receipt(None, &items)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
