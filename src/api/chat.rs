//! Streaming chat endpoint

use axum::{
    body::Body,
    extract::{Extension, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::middleware::RequestId;
use super::state::AppState;
use super::types::{ApiError, ChatRequest, Json};
use crate::domain::RelayRequest;
use crate::infrastructure::observability::record_relay_request;

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// POST /api/chat
///
/// Streams the assistant reply as plain text. Failures before streaming
/// starts are returned as an error response; a failure while streaming ends
/// the body early.
pub async fn relay_chat(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    Json(request): Json<ChatRequest>,
) -> Result<Response, ApiError> {
    let request_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_default();
    let relay_request = RelayRequest::from(request);
    let provider = state.relay.select_provider(&relay_request);

    info!(
        request_id = %request_id,
        provider = %provider,
        model = relay_request.model.as_deref().unwrap_or("default"),
        messages = relay_request.messages.len(),
        "Chat relay request"
    );

    match state.relay.relay(relay_request).await {
        Ok(output) => {
            record_relay_request(provider, "streaming");

            Ok((
                [(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)],
                Body::from_stream(output),
            )
                .into_response())
        }
        Err(e) => {
            record_relay_request(provider, e.kind());
            warn!(
                request_id = %request_id,
                provider = %provider,
                kind = e.kind(),
                error = %e,
                "Chat relay failed before streaming"
            );

            Err(e.into())
        }
    }
}
