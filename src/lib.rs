//! Chat relay
//!
//! Relays a conversation to an OpenAI-compatible provider (OpenAI or
//! OpenRouter) and streams the assistant reply back as plain text.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{ChatRelay, StreamObserver};
use infrastructure::observability::record_relay_stream;
use infrastructure::upstream::HttpUpstreamConnector;
use tracing::info;

/// Build the application state from configuration
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let registry = Arc::new(config.providers.build_registry());

    for profile in registry.profiles() {
        info!(
            provider = %profile.id(),
            base_url = %profile.base_url(),
            model = %profile.chat_model(),
            secret_configured = profile.has_secret(),
            "Provider registered"
        );
    }

    let connector = Arc::new(HttpUpstreamConnector::new(&config.upstream)?);
    let observer: StreamObserver = Arc::new(record_relay_stream);
    let relay = ChatRelay::new(registry, connector).with_observer(observer);

    Ok(AppState::new(relay))
}
