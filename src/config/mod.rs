//! Process configuration, loaded once at start

mod app_config;

pub use app_config::{
    AppConfig, LogFormat, LoggingConfig, ProviderSettings, ProvidersConfig, ServerConfig,
    UpstreamConfig,
};
