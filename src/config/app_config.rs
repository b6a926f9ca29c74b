use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{ProviderId, ProviderProfile, ProviderRegistry};
use crate::infrastructure::observability::ObservabilityConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Upstream HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Maximum silence between upstream reads; 0 disables the limit
    #[serde(default = "default_idle_read_timeout_secs")]
    pub idle_read_timeout_secs: u64,
}

/// Settings for one provider; unset fields fall back to built-in defaults
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub chat_model: Option<String>,
    pub extra_headers: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    pub default: Option<ProviderId>,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub openrouter: ProviderSettings,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_idle_read_timeout_secs() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            idle_read_timeout_secs: default_idle_read_timeout_secs(),
        }
    }
}

impl ProvidersConfig {
    pub fn settings(&self, id: ProviderId) -> &ProviderSettings {
        match id {
            ProviderId::OpenAi => &self.openai,
            ProviderId::OpenRouter => &self.openrouter,
        }
    }

    fn settings_mut(&mut self, id: ProviderId) -> &mut ProviderSettings {
        match id {
            ProviderId::OpenAi => &mut self.openai,
            ProviderId::OpenRouter => &mut self.openrouter,
        }
    }

    /// Fill unset secrets and the OpenRouter base URL from the conventional
    /// variables (`OPENAI_API_KEY`, `OPENROUTER_API_KEY`, `OPENROUTER_API_BASE`).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ProviderId::ALL {
            let settings = self.settings_mut(id);
            if settings.api_key.is_none() {
                settings.api_key = lookup(id.secret_env());
            }
        }

        if self.openrouter.base_url.is_none() {
            self.openrouter.base_url = lookup("OPENROUTER_API_BASE");
        }
    }

    pub fn profile(&self, id: ProviderId) -> ProviderProfile {
        let settings = self.settings(id);
        let mut profile = ProviderProfile::new(id).with_secret(settings.api_key.clone());

        if let Some(base_url) = &settings.base_url {
            profile = profile.with_base_url(base_url);
        }

        if let Some(model) = &settings.chat_model {
            profile = profile.with_chat_model(model);
        }

        if let Some(headers) = &settings.extra_headers {
            profile = profile.with_extra_headers(
                headers
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
        }

        profile
    }

    /// Freeze the provider settings into the read-only registry
    pub fn build_registry(&self) -> ProviderRegistry {
        ProviderRegistry::new(ProviderId::ALL.map(|id| self.profile(id)))
            .with_default_provider(self.default)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config
            .providers
            .apply_env(|key| std::env::var(key).ok());

        Ok(app_config)
    }
}
