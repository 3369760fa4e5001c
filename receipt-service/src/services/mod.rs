pub mod dispatcher;
pub mod metrics;
pub mod receipt;
pub mod relay;
pub mod repository;
pub mod transactions;

pub use dispatcher::{DeliveryReceipt, ReceiptDispatcher};
pub use self::metrics::{get_metrics, init_metrics};
pub use receipt::ReceiptRenderer;
pub use relay::{MailRelay, MockRelay, RelayError, SmtpRelay};
pub use repository::{InMemoryRepository, MongoRepository, ReceiptRepository};
pub use transactions::{PendingLink, TransactionStore};
