//! Transaction creation, lookup and listing over a [`ReceiptRepository`].
//!
//! Creation is a two-phase write. Phase one inserts every line item and then
//! the transaction header that references them; the result is a
//! [`PendingLink`], during which the items carry no back-reference yet. Phase
//! two ([`PendingLink::commit`]) writes the back-reference on every item.
//! Failures abort the pending writes of the current phase but never roll back
//! committed ones.

use crate::models::{LineItem, NewTransaction, Transaction, TransactionWithItems};
use crate::services::metrics::record_transaction_created;
use crate::services::repository::ReceiptRepository;
use futures::future::try_join_all;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct TransactionStore {
    repository: Arc<dyn ReceiptRepository>,
}

/// A transaction whose header is persisted but whose items are not yet
/// back-linked to it.
pub struct PendingLink {
    repository: Arc<dyn ReceiptRepository>,
    transaction: Transaction,
    items: Vec<LineItem>,
}

impl PendingLink {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Created items in caller order, still without `transaction_id`.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Writes the back-reference on every item, concurrently.
    pub async fn commit(self) -> Result<Transaction, AppError> {
        let transaction_id = self.transaction.id.as_str();

        try_join_all(self.items.iter().map(|item| {
            self.repository
                .link_line_item(&item.id, transaction_id)
        }))
        .await
        .map_err(|e| {
            tracing::error!(
                transaction_id = %transaction_id,
                error = %e,
                "Failed to link line items to transaction"
            );
            as_storage_error(e)
        })?;

        tracing::info!(
            transaction_id = %transaction_id,
            item_count = self.items.len(),
            "Line items linked to transaction"
        );

        Ok(self.transaction)
    }
}

fn as_storage_error(err: AppError) -> AppError {
    match err {
        AppError::StorageError(_) => err,
        other => AppError::StorageError(anyhow::anyhow!(other.to_string())),
    }
}

impl TransactionStore {
    pub fn new(repository: Arc<dyn ReceiptRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<dyn ReceiptRepository> {
        &self.repository
    }

    pub async fn create_transaction(&self, input: NewTransaction) -> Result<Transaction, AppError> {
        let pending = self.stage(input).await?;
        let transaction = pending.commit().await?;
        record_transaction_created(transaction.kind, transaction.items.len());
        Ok(transaction)
    }

    /// Phase one: insert the line items, then the header referencing them.
    pub async fn stage(&self, input: NewTransaction) -> Result<PendingLink, AppError> {
        if let Some(bad) = input
            .items
            .iter()
            .find(|item| !item.quantity.is_finite() || !item.unit_price.is_finite())
        {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Quantity and unit price of '{}' must be finite numbers",
                bad.product_name
            )));
        }

        let items: Vec<LineItem> = input.items.iter().map(LineItem::new).collect();

        if let Some(bad) = items.iter().find(|item| !item.total_price.is_finite()) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Total price of '{}' is out of range",
                bad.product_name
            )));
        }
        let total: f64 = items.iter().fold(0.0, |total, item| total + item.total_price);
        if !total.is_finite() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Transaction total is out of range"
            )));
        }

        try_join_all(
            items
                .iter()
                .map(|item| self.repository.insert_line_item(item)),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create line items");
            as_storage_error(e)
        })?;

        let transaction = Transaction::new(&input, &items);

        self.repository
            .insert_transaction(&transaction)
            .await
            .map_err(|e| {
                tracing::error!(
                    transaction_id = %transaction.id,
                    error = %e,
                    "Failed to create transaction header"
                );
                as_storage_error(e)
            })?;

        tracing::info!(
            transaction_id = %transaction.id,
            store_name = %transaction.store_name,
            item_count = items.len(),
            total = transaction.total,
            "Transaction created, linking line items"
        );

        Ok(PendingLink {
            repository: self.repository.clone(),
            transaction,
            items,
        })
    }

    pub async fn get_transaction(&self, id: &str) -> Result<TransactionWithItems, AppError> {
        let transaction = self
            .repository
            .find_transaction(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Transaction {} not found", id)))?;

        let items = self.repository.find_line_items(&transaction.items).await?;
        Ok(expand(transaction, &mut index_items(items)))
    }

    pub async fn list_transactions(&self) -> Result<Vec<TransactionWithItems>, AppError> {
        let transactions = self.repository.list_transactions().await?;

        let ids: Vec<String> = transactions
            .iter()
            .flat_map(|tx| tx.items.iter().cloned())
            .collect();
        let mut by_id = index_items(self.repository.find_line_items(&ids).await?);

        Ok(transactions
            .into_iter()
            .map(|tx| expand(tx, &mut by_id))
            .collect())
    }
}

fn index_items(items: Vec<LineItem>) -> HashMap<String, LineItem> {
    items
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect()
}

/// Resolves the header's item ids in header order. Dangling ids are skipped.
fn expand(transaction: Transaction, by_id: &mut HashMap<String, LineItem>) -> TransactionWithItems {
    let items = transaction
        .items
        .iter()
        .filter_map(|id| {
            let item = by_id.remove(id);
            if item.is_none() {
                tracing::warn!(
                    transaction_id = %transaction.id,
                    line_item_id = %id,
                    "Transaction references a missing line item"
                );
            }
            item
        })
        .collect();

    TransactionWithItems { transaction, items }
}
