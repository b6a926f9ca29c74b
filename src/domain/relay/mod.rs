//! Streaming chat relay
//!
//! Flow per invocation: `ProviderRegistry` → `RequestBuilder` →
//! `UpstreamConnector` → `FrameDecoder` → `extract_delta` → `OutputStream`.

mod connector;
mod delta;
mod frame;
mod output;
mod request;
mod service;

pub use connector::{ByteStream, UpstreamConnector};
pub use delta::{extract_delta, DeltaEvent, Envelope};
pub use frame::FrameDecoder;
pub use output::{OutputStream, StreamEnd, StreamSummary};
pub use request::{RequestBuilder, UpstreamRequest};
pub use service::{ChatRelay, RelayRequest, StreamObserver};

#[cfg(test)]
pub use connector::mock::MockUpstreamConnector;
