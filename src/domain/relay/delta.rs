//! Text extraction from `data: ` event lines.
//!
//! Heartbeats, comments and malformed payloads are normal on real upstream
//! connections. They are recovered here and never abort the relay.

use serde_json::Value;

const EVENT_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of decoding one complete line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEvent {
    /// Non-empty text to forward verbatim
    Fragment(String),
    /// `data: [DONE]`
    Done,
    /// Not an event line (comments, blank separators, other SSE fields)
    Ignored,
    /// Event line whose payload was not JSON or had no usable content
    Anomaly,
}

/// Known envelope shapes of a completion payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// `choices[0].delta.content`, token streaming
    Delta(String),
    /// `choices[0].message.content`, a whole message inside a stream envelope
    Message(String),
    Unknown,
}

impl Envelope {
    /// Delta content wins over message content; empty strings count as absent.
    pub fn classify(payload: &Value) -> Self {
        let Some(choice) = payload
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
        else {
            return Self::Unknown;
        };

        if let Some(text) = non_empty_content(choice, "delta") {
            return Self::Delta(text.to_string());
        }

        if let Some(text) = non_empty_content(choice, "message") {
            return Self::Message(text.to_string());
        }

        Self::Unknown
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Delta(text) | Self::Message(text) => Some(text),
            Self::Unknown => None,
        }
    }
}

fn non_empty_content<'a>(choice: &'a Value, field: &str) -> Option<&'a str> {
    choice
        .get(field)
        .and_then(|holder| holder.get("content"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// Classify one complete line and extract at most one fragment from it
pub fn extract_delta(line: &str) -> DeltaEvent {
    let Some(payload) = line.strip_prefix(EVENT_PREFIX) else {
        return DeltaEvent::Ignored;
    };

    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return DeltaEvent::Done;
    }

    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            tracing::trace!(error = %e, "Skipping event line with malformed JSON");
            return DeltaEvent::Anomaly;
        }
    };

    match Envelope::classify(&value).into_text() {
        Some(text) => DeltaEvent::Fragment(text),
        None => {
            tracing::trace!("Skipping event line without text content");
            DeltaEvent::Anomaly
        }
    }
}
