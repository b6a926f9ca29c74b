use thiserror::Error;

use super::provider::ProviderId;

/// Errors raised while relaying a conversation to an upstream provider
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Missing {env_key} for selected provider '{provider}'")]
    MissingSecret {
        provider: ProviderId,
        env_key: &'static str,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Upstream responded with status {status}")]
    UpstreamRejection { status: u16, body: String },

    #[error("Transport failure: {message}")]
    Transport { message: String },
}

impl RelayError {
    pub fn missing_secret(provider: ProviderId) -> Self {
        Self::MissingSecret {
            provider,
            env_key: provider.secret_env(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Upstream rejection carrying the body verbatim; an empty body becomes
    /// `Upstream error`.
    pub fn upstream_rejection(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = if body.is_empty() {
            "Upstream error".to_string()
        } else {
            body
        };

        Self::UpstreamRejection { status, body }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingSecret { .. } | Self::Configuration { .. } => "config_error",
            Self::Validation { .. } => "invalid_request",
            Self::UpstreamRejection { .. } => "upstream_rejected",
            Self::Transport { .. } => "transport_error",
        }
    }
}
