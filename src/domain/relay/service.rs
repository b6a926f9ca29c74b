use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{OutputStream, RequestBuilder, StreamSummary, UpstreamConnector};
use crate::domain::provider::{ProviderId, ProviderRegistry};
use crate::domain::{ConversationMessage, RelayError};

/// One conversation to relay
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub messages: Vec<ConversationMessage>,
    pub model: Option<String>,
    pub provider: Option<ProviderId>,
}

impl RelayRequest {
    pub fn new(messages: Vec<ConversationMessage>) -> Self {
        Self {
            messages,
            model: None,
            provider: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Called once per relay invocation when its output stream ends
pub type StreamObserver = Arc<dyn Fn(ProviderId, &StreamSummary) + Send + Sync>;

/// Streaming chat relay: provider selection, the single upstream call, and
/// transcoding of the upstream event stream into plain text.
#[derive(Clone)]
pub struct ChatRelay {
    registry: Arc<ProviderRegistry>,
    connector: Arc<dyn UpstreamConnector>,
    observer: Option<StreamObserver>,
}

impl ChatRelay {
    pub fn new(registry: Arc<ProviderRegistry>, connector: Arc<dyn UpstreamConnector>) -> Self {
        Self {
            registry,
            connector,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: StreamObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Provider a request will be sent to
    pub fn select_provider(&self, request: &RelayRequest) -> ProviderId {
        request
            .provider
            .unwrap_or_else(|| self.registry.default_provider())
    }

    /// Relay a conversation and return the text stream.
    ///
    /// Configuration and validation failures happen before any network call.
    /// An upstream rejection is terminal and carries the upstream status and
    /// body unchanged.
    pub async fn relay(&self, request: RelayRequest) -> Result<OutputStream, RelayError> {
        if request.messages.is_empty() {
            return Err(RelayError::validation("Messages array is required"));
        }

        self.registry.ensure_any_secret()?;

        let provider = self.select_provider(&request);
        let profile = self.registry.resolve(provider)?;
        let upstream_request =
            RequestBuilder::new(profile).build(&request.messages, request.model.as_deref())?;

        info!(
            provider = %provider,
            model = %upstream_request.model(),
            messages = request.messages.len(),
            "Relaying chat to upstream"
        );

        let body = match self.connector.send(upstream_request).await {
            Ok(body) => body,
            Err(e) => {
                warn!(provider = %provider, error = %e, "Upstream call failed");
                return Err(e);
            }
        };

        debug!(provider = %provider, "Upstream accepted request, streaming");

        Ok(match self.observer.clone() {
            Some(observer) => OutputStream::with_finish_hook(body, move |summary| {
                observer(provider, summary)
            }),
            None => OutputStream::new(body),
        })
    }
}

impl std::fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay")
            .field("registry", &self.registry)
            .field("connector", &self.connector)
            .finish_non_exhaustive()
    }
}
