//! Metrics collection for receipt-service.

use crate::models::TransactionType;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() {
    if METRICS_HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => tracing::warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_transaction_created(kind: TransactionType, item_count: usize) {
    counter!("receipt_transactions_created_total", "type" => kind.to_string()).increment(1);
    counter!("receipt_line_items_created_total").increment(item_count as u64);
}

pub fn record_document_rendered() {
    counter!("receipt_documents_rendered_total").increment(1);
}

pub fn record_delivery(relay: &'static str, status: &'static str) {
    counter!("receipt_deliveries_total", "relay" => relay, "status" => status).increment(1);
}
