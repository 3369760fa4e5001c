pub mod line_item;
pub mod transaction;

pub use line_item::{LineItem, NewLineItem};
pub use transaction::{NewTransaction, Transaction, TransactionType, TransactionWithItems};
