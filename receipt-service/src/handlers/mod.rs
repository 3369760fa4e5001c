pub mod health;
pub mod transactions;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use transactions::{
    create_transaction, download_receipt, get_transaction, list_transactions, send_receipt,
};
