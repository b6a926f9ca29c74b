//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;
use crate::domain::{ProviderId, StreamEnd, StreamSummary};

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("chat_relay_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path.clone();

    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", truncate_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Count a relay request by how it left the relay before streaming began
pub fn record_relay_request(provider: ProviderId, outcome: &str) {
    counter!(
        "relay_requests_total",
        "provider" => provider.as_str(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record the counters of a finished relay stream
pub fn record_relay_stream(provider: ProviderId, summary: &StreamSummary) {
    let provider = provider.as_str();

    counter!("relay_fragments_total", "provider" => provider).increment(summary.fragments);
    counter!("relay_decode_anomalies_total", "provider" => provider)
        .increment(summary.anomalies);
    counter!(
        "relay_streams_total",
        "provider" => provider,
        "end" => summary.end.as_str()
    )
    .increment(1);

    if summary.end == StreamEnd::TransportFailure {
        counter!("relay_transport_failures_total", "provider" => provider).increment(1);
    }
}

/// Bound label length for unmatched paths
fn truncate_path(path: &str) -> String {
    path.chars().take(50).collect()
}
