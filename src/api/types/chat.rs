//! Inbound chat request

use serde::{Deserialize, Serialize};

use crate::domain::{ConversationMessage, ProviderId, RelayRequest};

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Missing and empty lists are both rejected by the relay with 400
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
}

impl From<ChatRequest> for RelayRequest {
    fn from(request: ChatRequest) -> Self {
        let mut relay = RelayRequest::new(request.messages);
        relay.model = request.model;
        relay.provider = request.provider;
        relay
    }
}
