//! Observability infrastructure - Logging, tracing export and metrics

mod config;
mod log_text;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use log_text::truncate_for_log;
pub use metrics::{
    create_metrics_router, init_metrics, record_http_request, record_relay_request,
    record_relay_stream, PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
