//! HTTP access to upstream providers

mod http_client;

pub use http_client::HttpUpstreamConnector;
