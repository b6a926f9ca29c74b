use super::{ProviderId, ProviderProfile};
use crate::domain::RelayError;

/// Read-only lookup of provider profiles, built once at process start
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    profiles: Vec<ProviderProfile>,
    default_provider: Option<ProviderId>,
}

impl ProviderRegistry {
    /// Later profiles replace earlier ones with the same identifier
    pub fn new(profiles: impl IntoIterator<Item = ProviderProfile>) -> Self {
        let mut registry = Self {
            profiles: Vec::new(),
            default_provider: None,
        };

        for profile in profiles {
            registry.profiles.retain(|p| p.id() != profile.id());
            registry.profiles.push(profile);
        }

        registry
    }

    pub fn with_default_provider(mut self, provider: Option<ProviderId>) -> Self {
        self.default_provider = provider;
        self
    }

    /// Look up a provider and make sure it can be called
    pub fn resolve(&self, id: ProviderId) -> Result<&ProviderProfile, RelayError> {
        let profile = self.get(id).ok_or_else(|| {
            RelayError::configuration(format!("Provider '{}' is not configured", id))
        })?;

        if !profile.has_secret() {
            return Err(RelayError::missing_secret(id));
        }

        Ok(profile)
    }

    /// Fails when no provider at all has a secret
    pub fn ensure_any_secret(&self) -> Result<(), RelayError> {
        if self.profiles.iter().any(ProviderProfile::has_secret) {
            return Ok(());
        }

        let keys: Vec<&str> = ProviderId::ALL.iter().map(|id| id.secret_env()).collect();
        Err(RelayError::configuration(format!("Provide {}", keys.join(" or "))))
    }

    /// Explicit default if configured, otherwise OpenRouter when it has a
    /// secret, otherwise OpenAI.
    pub fn default_provider(&self) -> ProviderId {
        if let Some(id) = self.default_provider {
            return id;
        }

        match self.get(ProviderId::OpenRouter) {
            Some(profile) if profile.has_secret() => ProviderId::OpenRouter,
            _ => ProviderId::OpenAi,
        }
    }

    pub fn get(&self, id: ProviderId) -> Option<&ProviderProfile> {
        self.profiles.iter().find(|p| p.id() == id)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ProviderProfile> {
        self.profiles.iter()
    }
}
