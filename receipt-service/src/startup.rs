//! Application startup and lifecycle management.

use crate::config::{ReceiptConfig, StoreBackend};
use crate::handlers;
use crate::services::{
    InMemoryRepository, MailRelay, MockRelay, MongoRepository, ReceiptDispatcher,
    ReceiptRenderer, ReceiptRepository, SmtpRelay, TransactionStore,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ReceiptConfig,
    pub repository: Arc<dyn ReceiptRepository>,
    pub transactions: TransactionStore,
    pub dispatcher: ReceiptDispatcher,
}

impl AppState {
    pub fn new(
        config: ReceiptConfig,
        repository: Arc<dyn ReceiptRepository>,
        relay: Arc<dyn MailRelay>,
    ) -> Self {
        let transactions = TransactionStore::new(repository.clone());
        let dispatcher = ReceiptDispatcher::new(
            transactions.clone(),
            ReceiptRenderer::new(config.receipt.currency.clone()),
            relay,
            config.receipt.mail_subject.clone(),
            config.receipt.mail_body.clone(),
        );

        Self {
            config,
            repository,
            transactions,
            dispatcher,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/send", post(handlers::send_receipt))
        .route("/transactions/:id", get(handlers::get_transaction))
        .route("/transactions/:id/receipt", get(handlers::download_receipt))
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn build_repository(config: &ReceiptConfig) -> Result<Arc<dyn ReceiptRepository>, AppError> {
    match config.store.backend {
        StoreBackend::Mongo => {
            let mongo = &config.store.mongodb;
            let repository = MongoRepository::connect(&mongo.uri, &mongo.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;
            repository.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(repository))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory receipt store; data is lost on restart");
            Ok(Arc::new(InMemoryRepository::new()))
        }
    }
}

fn build_relay(config: &ReceiptConfig) -> Arc<dyn MailRelay> {
    if !config.smtp.enabled {
        tracing::info!("SMTP relay disabled, using mock relay");
        return Arc::new(MockRelay::new(true));
    }

    match SmtpRelay::new(config.smtp.clone()) {
        Ok(relay) => {
            tracing::info!(host = %config.smtp.host, port = config.smtp.port, "SMTP relay initialized");
            Arc::new(relay)
        }
        Err(e) => {
            tracing::warn!("Failed to initialize SMTP relay: {}. Using mock.", e);
            Arc::new(MockRelay::new(true))
        }
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    /// Build the application with backends chosen from configuration.
    pub async fn build(config: ReceiptConfig) -> Result<Self, AppError> {
        let repository = build_repository(&config).await?;
        let relay = build_relay(&config);
        Self::build_with(config, repository, relay).await
    }

    /// Build the application around explicit repository and relay instances.
    pub async fn build_with(
        config: ReceiptConfig,
        repository: Arc<dyn ReceiptRepository>,
        relay: Arc<dyn MailRelay>,
    ) -> Result<Self, AppError> {
        let port = config.common.port;
        let app = router(AppState::new(config, repository, relay));

        // Port 0 picks a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Receipt service listening on port {}", port);

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .into_future();

        Ok(Self {
            port,
            server: Box::new(Box::pin(server)),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
