//! Persistence for transactions and line items.
//!
//! The two record kinds reference each other by id only: the transaction keeps
//! the ordered list of its item ids, each item keeps an optional transaction id.

pub mod memory;
pub mod mongo;

use crate::models::{LineItem, Transaction};
use async_trait::async_trait;
use service_core::error::AppError;

pub use memory::InMemoryRepository;
pub use mongo::MongoRepository;

#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    async fn insert_line_item(&self, item: &LineItem) -> Result<(), AppError>;

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), AppError>;

    /// Sets the back-reference of one line item. Fails if the item is missing.
    async fn link_line_item(&self, item_id: &str, transaction_id: &str) -> Result<(), AppError>;

    async fn find_transaction(&self, id: &str) -> Result<Option<Transaction>, AppError>;

    /// Returns the items that exist among `ids`, in no particular order.
    async fn find_line_items(&self, ids: &[String]) -> Result<Vec<LineItem>, AppError>;

    /// All transactions, oldest first.
    async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
