//! Upstream provider profiles and their registry

mod profile;
mod registry;

pub use profile::{ProviderId, ProviderProfile};
pub use registry::ProviderRegistry;
