use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use super::UpstreamRequest;
use crate::domain::RelayError;

/// Raw body of a successful upstream response
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send>>;

/// Sends a single upstream request and waits for the response headers.
///
/// A non-success status is returned as `RelayError::UpstreamRejection` with the
/// whole body read as text. Implementations never retry.
#[async_trait]
pub trait UpstreamConnector: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: UpstreamRequest) -> Result<ByteStream, RelayError>;
}
