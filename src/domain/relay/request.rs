use serde_json::json;

use crate::domain::provider::ProviderProfile;
use crate::domain::{ConversationMessage, RelayError};

/// Outbound completion request, ready to be sent by an `UpstreamConnector`
#[derive(Clone, PartialEq)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl UpstreamRequest {
    pub fn method(&self) -> &'static str {
        "POST"
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn model(&self) -> &str {
        self.body["model"].as_str().unwrap_or_default()
    }
}

impl std::fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if key.eq_ignore_ascii_case("authorization") {
                    (key.as_str(), "[REDACTED]")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("UpstreamRequest")
            .field("url", &self.url)
            .field("headers", &headers)
            .field("model", &self.model())
            .finish()
    }
}

/// Assembles streaming chat completion requests for a provider profile
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    profile: &'a ProviderProfile,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(profile: &'a ProviderProfile) -> Self {
        Self { profile }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.profile.base_url())
    }

    fn headers(&self, secret: &str) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Authorization".to_string(), format!("Bearer {}", secret)),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        headers.extend(self.profile.extra_headers().iter().cloned());
        headers
    }

    /// An empty model override falls back to the profile default.
    pub fn build(
        &self,
        messages: &[ConversationMessage],
        model: Option<&str>,
    ) -> Result<UpstreamRequest, RelayError> {
        let secret = self
            .profile
            .secret()
            .ok_or_else(|| RelayError::missing_secret(self.profile.id()))?;

        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.profile.chat_model());

        Ok(UpstreamRequest {
            url: self.chat_completions_url(),
            headers: self.headers(secret),
            body: json!({
                "model": model,
                "stream": true,
                "messages": messages,
            }),
        })
    }
}
