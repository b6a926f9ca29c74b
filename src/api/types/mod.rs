//! Request and error types of the HTTP surface

pub mod chat;
pub mod error;
pub mod json;

pub use chat::ChatRequest;
pub use error::{ApiError, ApiErrorBody, ApiErrorResponse};
pub use json::Json;
