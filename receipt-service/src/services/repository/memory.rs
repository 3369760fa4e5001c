use super::ReceiptRepository;
use crate::models::{LineItem, Transaction};
use async_trait::async_trait;
use dashmap::DashMap;
use service_core::error::AppError;
use std::sync::atomic::{AtomicI64, Ordering};

const UNLIMITED: i64 = -1;

/// Process-local repository, used by tests and `RECEIPT_STORE=memory`.
///
/// A write budget can be set to make every write past the first `n` fail,
/// which is how partial-failure behavior is exercised.
pub struct InMemoryRepository {
    transactions: DashMap<String, Transaction>,
    line_items: DashMap<String, LineItem>,
    writes_remaining: AtomicI64,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
            line_items: DashMap::new(),
            writes_remaining: AtomicI64::new(UNLIMITED),
        }
    }

    /// Allows `writes` more successful writes; later writes fail.
    pub fn fail_after_writes(&self, writes: u32) {
        self.writes_remaining
            .store(i64::from(writes), Ordering::SeqCst);
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn line_item_count(&self) -> usize {
        self.line_items.len()
    }

    /// Items never referenced by any stored transaction.
    pub fn orphaned_line_items(&self) -> Vec<LineItem> {
        self.line_items
            .iter()
            .filter(|entry| {
                !self
                    .transactions
                    .iter()
                    .any(|tx| tx.items.contains(&entry.id))
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn consume_write(&self) -> Result<(), AppError> {
        let allowed = self
            .writes_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                match remaining {
                    UNLIMITED => Some(UNLIMITED),
                    0 => None,
                    n => Some(n - 1),
                }
            })
            .is_ok();

        if allowed {
            Ok(())
        } else {
            Err(AppError::StorageError(anyhow::anyhow!(
                "In-memory write budget exhausted"
            )))
        }
    }
}

#[async_trait]
impl ReceiptRepository for InMemoryRepository {
    async fn insert_line_item(&self, item: &LineItem) -> Result<(), AppError> {
        self.consume_write()?;
        self.line_items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), AppError> {
        self.consume_write()?;
        self.transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(())
    }

    async fn link_line_item(&self, item_id: &str, transaction_id: &str) -> Result<(), AppError> {
        self.consume_write()?;
        let mut item = self.line_items.get_mut(item_id).ok_or_else(|| {
            AppError::StorageError(anyhow::anyhow!("Line item {} does not exist", item_id))
        })?;
        item.transaction_id = Some(transaction_id.to_string());
        Ok(())
    }

    async fn find_transaction(&self, id: &str) -> Result<Option<Transaction>, AppError> {
        Ok(self.transactions.get(id).map(|tx| tx.value().clone()))
    }

    async fn find_line_items(&self, ids: &[String]) -> Result<Vec<LineItem>, AppError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.line_items.get(id).map(|item| item.value().clone()))
            .collect())
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .iter()
            .map(|tx| tx.value().clone())
            .collect();
        transactions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(transactions)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
