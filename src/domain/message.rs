use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Content part for multimodal messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

/// Image reference inside a content part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Text content or an ordered list of parts. Shapes the relay does not
/// model (other part types, `null`) are kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    Raw(Value),
}

/// A message in a conversation, forwarded upstream as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: MessageContent,
    /// Fields such as `name` or `tool_call_id`, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversationMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, content)
    }

    fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
            extra: Map::new(),
        }
    }

    pub fn content_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Parts(parts) => parts.iter().find_map(|p| match p {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::ImageUrl { .. } => None,
            }),
            MessageContent::Raw(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ConversationMessage::user("Hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content_text(), Some("Hello"));
    }

    #[test]
    fn test_text_message_serialization() {
        let msg = ConversationMessage::assistant("Hi there!");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "role": "assistant", "content": "Hi there!" })
        );
    }

    #[test]
    fn test_parts_message_survives_as_given() {
        let raw = serde_json::json!({
            "role": "user",
            "content": [
                { "type": "text", "text": "What is in this picture?" },
                { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } }
            ]
        });

        let msg: ConversationMessage = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.content_text(), Some("What is in this picture?"));
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let raw = serde_json::json!({ "role": "narrator", "content": "x" });
        assert!(serde_json::from_value::<ConversationMessage>(raw).is_err());
    }

    #[test]
    fn test_extra_fields_forwarded() {
        let raw = serde_json::json!({
            "role": "user",
            "name": "alice",
            "content": "Hello"
        });

        let msg: ConversationMessage = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.extra.get("name"), Some(&serde_json::json!("alice")));
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_unmodelled_content_kept_raw() {
        let raw = serde_json::json!({
            "role": "user",
            "content": [{ "type": "input_audio", "input_audio": { "data": "AAAA", "format": "wav" } }]
        });

        let msg: ConversationMessage = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(msg.content, MessageContent::Raw(_)));
        assert_eq!(msg.content_text(), None);
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }

    #[test]
    fn test_tool_message_with_null_content() {
        let raw = serde_json::json!({
            "role": "tool",
            "tool_call_id": "call_1",
            "content": null
        });

        let msg: ConversationMessage = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(serde_json::to_value(&msg).unwrap(), raw);
    }
}
