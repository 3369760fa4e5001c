use super::ReceiptRepository;
use crate::models::{LineItem, Transaction};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoRepository {
    client: MongoClient,
    db: Database,
}

fn storage_error(context: &str, e: mongodb::error::Error) -> AppError {
    tracing::error!("{}: {}", context, e);
    AppError::StorageError(anyhow::anyhow!("{}: {}", context, e))
}

impl MongoRepository {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri)
            .await
            .map_err(|e| storage_error("Failed to connect to MongoDB", e))?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn transactions(&self) -> Collection<Transaction> {
        self.db.collection("transactions")
    }

    pub fn line_items(&self) -> Collection<LineItem> {
        self.db.collection("line_items")
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for receipt-service");

        let transaction_id_index = IndexModel::builder()
            .keys(doc! { "transaction_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("transaction_id_idx".to_string())
                    .sparse(true)
                    .build(),
            )
            .build();

        self.line_items()
            .create_index(transaction_id_index, None)
            .await
            .map_err(|e| storage_error("Failed to create transaction_id index", e))?;

        let date_index = IndexModel::builder()
            .keys(doc! { "date": 1 })
            .options(IndexOptions::builder().name("date_idx".to_string()).build())
            .build();

        self.transactions()
            .create_index(date_index, None)
            .await
            .map_err(|e| storage_error("Failed to create date index", e))?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }
}

#[async_trait]
impl ReceiptRepository for MongoRepository {
    async fn insert_line_item(&self, item: &LineItem) -> Result<(), AppError> {
        self.line_items()
            .insert_one(item, None)
            .await
            .map_err(|e| storage_error("Failed to insert line item", e))?;
        Ok(())
    }

    async fn insert_transaction(&self, transaction: &Transaction) -> Result<(), AppError> {
        self.transactions()
            .insert_one(transaction, None)
            .await
            .map_err(|e| storage_error("Failed to insert transaction", e))?;
        Ok(())
    }

    async fn link_line_item(&self, item_id: &str, transaction_id: &str) -> Result<(), AppError> {
        let result = self
            .line_items()
            .update_one(
                doc! { "_id": item_id },
                doc! { "$set": { "transaction_id": transaction_id } },
                None,
            )
            .await
            .map_err(|e| storage_error("Failed to link line item", e))?;

        if result.matched_count == 0 {
            return Err(AppError::StorageError(anyhow::anyhow!(
                "Line item {} does not exist",
                item_id
            )));
        }
        Ok(())
    }

    async fn find_transaction(&self, id: &str) -> Result<Option<Transaction>, AppError> {
        self.transactions()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(AppError::from)
    }

    async fn find_line_items(&self, ids: &[String]) -> Result<Vec<LineItem>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .line_items()
            .find(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await
            .map_err(|e| storage_error("Failed to query line items", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| storage_error("Failed to read line items", e))
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "date": 1, "_id": 1 })
            .build();

        let cursor = self
            .transactions()
            .find(doc! {}, options)
            .await
            .map_err(|e| storage_error("Failed to list transactions", e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| storage_error("Failed to read transactions", e))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| storage_error("MongoDB health check failed", e))?;
        Ok(())
    }
}
