use std::sync::{Arc, Mutex, RwLock};
use anyhow::anyhow;
use log::{info, warn};
use thiserror::Error;

use crate::config::{LlmConfig, ProviderKind};
use crate::services::anthropic::AnthropicProvider;
use crate::services::openai::OpenAiProvider;
use crate::services::patterns::RegistryError;
use crate::services::rule_based::RuleBasedProvider;
use crate::services::LlmProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The remote service answered with a non-success status
    #[error("{provider} API error: Status {status}, Details: {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Empty response from {provider}")]
    EmptyContent { provider: &'static str },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ProviderError {
    /// HTTP status reported by the remote service, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            ProviderError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Build the provider selected by `config`. A remote provider without an API
/// key falls back to the rule-based engine.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let api_key = match (config.provider, config.api_key()) {
        (ProviderKind::Mock, _) => None,
        (kind, Some(key)) => Some((kind, key)),
        (kind, None) => {
            warn!("{} selected but no API key is set, using rule-based provider", kind);
            None
        }
    };

    let provider: Arc<dyn LlmProvider> = match api_key {
        Some((ProviderKind::OpenAi, key)) => Arc::new(OpenAiProvider::new(config, key)?),
        Some((ProviderKind::Anthropic, key)) => Arc::new(AnthropicProvider::new(config, key)?),
        _ => Arc::new(RuleBasedProvider::new()?),
    };

    info!("Created {} provider", provider.kind());
    Ok(provider)
}

/// Owns the provider configuration and lazily builds, caches and resets the
/// provider instance. The next `get` after `invalidate` sees the current config.
pub struct ProviderHandle {
    config: RwLock<LlmConfig>,
    current: Mutex<Option<Arc<dyn LlmProvider>>>,
}

impl ProviderHandle {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            config: RwLock::new(config),
            current: Mutex::new(None),
        }
    }

    /// The cached provider, building it from the current config if needed
    pub fn get(&self) -> anyhow::Result<Arc<dyn LlmProvider>> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| anyhow!("Failed to acquire lock on provider"))?;

        if let Some(provider) = current.as_ref() {
            return Ok(Arc::clone(provider));
        }

        let config = self.config()?;
        let provider = create_provider(&config)?;
        *current = Some(Arc::clone(&provider));
        Ok(provider)
    }

    /// Drop the cached provider so the next `get` rebuilds it
    pub fn invalidate(&self) -> anyhow::Result<()> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| anyhow!("Failed to acquire lock on provider"))?;
        *current = None;
        Ok(())
    }

    /// Replace the configuration and invalidate the cached provider
    pub fn reconfigure(&self, config: LlmConfig) -> anyhow::Result<()> {
        {
            let mut guard = self
                .config
                .write()
                .map_err(|_| anyhow!("Failed to acquire lock on provider config"))?;
            info!("Provider configuration changed to {:?}", config);
            *guard = config;
        }
        self.invalidate()
    }

    pub fn config(&self) -> anyhow::Result<LlmConfig> {
        let guard = self
            .config
            .read()
            .map_err(|_| anyhow!("Failed to acquire lock on provider config"))?;
        Ok(guard.clone())
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle").finish_non_exhaustive()
    }
}
