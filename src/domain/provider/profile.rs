use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical identifier of a supported upstream provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    OpenRouter,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenAi, ProviderId::OpenRouter];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::OpenRouter => "openrouter",
        }
    }

    /// Environment variable conventionally holding this provider's secret
    pub fn secret_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_chat_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::OpenRouter => "openai/gpt-4o-mini",
        }
    }

    /// Attribution headers OpenRouter expects on every call
    pub fn default_extra_headers(&self) -> Vec<(String, String)> {
        match self {
            Self::OpenAi => Vec::new(),
            Self::OpenRouter => vec![
                ("HTTP-Referer".to_string(), "https://localhost".to_string()),
                ("X-Title".to_string(), "REKA-POC".to_string()),
            ],
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection details for one upstream provider
#[derive(Clone)]
pub struct ProviderProfile {
    id: ProviderId,
    base_url: String,
    secret: Option<String>,
    chat_model: String,
    extra_headers: Vec<(String, String)>,
}

impl ProviderProfile {
    /// Profile with the built-in defaults for `id` and no secret
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            base_url: id.default_base_url().to_string(),
            secret: None,
            chat_model: id.default_chat_model().to_string(),
            extra_headers: id.default_extra_headers(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Blank secrets are treated as absent
    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_chat_model(mut self, chat_model: impl Into<String>) -> Self {
        self.chat_model = chat_model.into();
        self
    }

    pub fn with_extra_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.extra_headers = headers;
        self
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.extra_headers
    }
}

impl fmt::Debug for ProviderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderProfile")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("chat_model", &self.chat_model)
            .field("extra_headers", &self.extra_headers)
            .finish()
    }
}
