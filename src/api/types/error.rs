//! HTTP error responses

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::RelayError;

/// `{"error": "..."}` body used for every locally produced failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}

/// Response body of a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorBody {
    Envelope(ApiErrorResponse),
    /// Upstream rejection text, passed through as-is
    Upstream(String),
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorBody::Envelope(ApiErrorResponse {
                error: message.into(),
            }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Mirror an upstream rejection; statuses outside the valid range become 502
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            body: ApiErrorBody::Upstream(body.into()),
        }
    }

    pub fn message(&self) -> &str {
        match &self.body {
            ApiErrorBody::Envelope(envelope) => &envelope.error,
            ApiErrorBody::Upstream(text) => text,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.body {
            ApiErrorBody::Envelope(envelope) => (self.status, Json(envelope)).into_response(),
            ApiErrorBody::Upstream(text) => (
                self.status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                text,
            )
                .into_response(),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MissingSecret { .. } => Self::bad_request(err.to_string()),
            RelayError::Validation { message } => Self::bad_request(message),
            RelayError::Configuration { message } => Self::internal(message),
            RelayError::UpstreamRejection { status, body } => Self::upstream(status, body),
            RelayError::Transport { message } => Self::bad_gateway(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.message())
    }
}

impl std::error::Error for ApiError {}
