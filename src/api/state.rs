//! Application state shared by handlers

use crate::domain::{ChatRelay, ProviderRegistry};

#[derive(Clone, Debug)]
pub struct AppState {
    pub relay: ChatRelay,
}

impl AppState {
    pub fn new(relay: ChatRelay) -> Self {
        Self { relay }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        self.relay.registry()
    }
}
