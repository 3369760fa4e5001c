#![allow(dead_code)]

use receipt_service::config::{
    MongoConfig, ReceiptConfig, ReceiptSettings, SmtpConfig, StoreBackend, StoreConfig,
};
use receipt_service::services::{InMemoryRepository, MailRelay, MockRelay};
use receipt_service::startup::Application;
use secrecy::SecretString;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub repository: Arc<InMemoryRepository>,
    pub relay: Arc<MockRelay>,
    pub client: reqwest::Client,
}

pub fn test_config() -> ReceiptConfig {
    ReceiptConfig {
        common: CoreConfig { port: 0 }, // Random port for testing
        store: StoreConfig {
            backend: StoreBackend::Memory,
            mongodb: MongoConfig {
                uri: String::new(),
                database: "receipt_test".to_string(),
            },
        },
        smtp: SmtpConfig {
            host: "smtp.test.local".to_string(),
            port: 587,
            user: "test".to_string(),
            password: SecretString::new("test".to_string()),
            from_email: "test@example.com".to_string(),
            from_name: "Test Receipts".to_string(),
            starttls: true,
            timeout_secs: 5,
            enabled: false, // Use mock
        },
        receipt: ReceiptSettings::default(),
        otlp_endpoint: None,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_relay(Arc::new(MockRelay::new(true))).await
    }

    pub async fn spawn_with_relay(relay: Arc<MockRelay>) -> Self {
        let repository = Arc::new(InMemoryRepository::new());
        let mail_relay: Arc<dyn MailRelay> = relay.clone();
        Self::spawn_with(repository, mail_relay, relay).await
    }

    /// Spawns against an arbitrary relay; `relay` is still returned for
    /// inspection but is not the one wired in.
    pub async fn spawn_with(
        repository: Arc<InMemoryRepository>,
        mail_relay: Arc<dyn MailRelay>,
        relay: Arc<MockRelay>,
    ) -> Self {
        let app = Application::build_with(test_config(), repository.clone(), mail_relay)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            repository,
            relay,
            client,
        }
    }

    pub async fn create_transaction(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/transactions", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_transaction(&self, id: &str) -> reqwest::Response {
        self.client
            .get(format!("{}/transactions/{}", self.address, id))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn send_receipt(&self, id: &str, recipient: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/transactions/send", self.address))
            .json(&json!({ "id": id, "recipientAddress": recipient }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn corner_shop_transaction() -> Value {
    json!({
        "type": "outbound",
        "storeName": "Corner Shop",
        "user": "alice",
        "items": [
            { "productName": "Widget", "quantity": 2, "unitPrice": 10.00 }
        ]
    })
}
