//! Domain layer - Relay core, providers and conversation types

pub mod error;
pub mod message;
pub mod provider;
pub mod relay;

pub use error::RelayError;
pub use message::{ContentPart, ConversationMessage, ImageUrl, MessageContent, MessageRole};
pub use provider::{ProviderId, ProviderProfile, ProviderRegistry};
pub use relay::{
    extract_delta, ByteStream, ChatRelay, DeltaEvent, Envelope, FrameDecoder, OutputStream,
    RelayRequest, RequestBuilder, StreamEnd, StreamObserver, StreamSummary, UpstreamConnector,
    UpstreamRequest,
};
