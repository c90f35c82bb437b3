use crate::config::ProviderKind;
use crate::models::conversation::QueryContext;
use crate::models::response::ResponseMessage;
use crate::services::patterns::{PatternRegistry, RegistryError};
use crate::services::provider::ProviderError;
use crate::services::LlmProvider;

/// Deterministic provider answering from the pattern registry
#[derive(Debug, Clone)]
pub struct RuleBasedProvider {
    registry: PatternRegistry,
}

impl RuleBasedProvider {
    pub fn new() -> Result<Self, RegistryError> {
        Ok(Self::with_registry(PatternRegistry::standard()?))
    }

    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    /// Synchronous dispatch; the async trait method wraps this
    pub fn process_query(&self, query: &str, context: &QueryContext) -> ResponseMessage {
        self.registry.dispatch(query, context)
    }

    pub fn registry(&self) -> &PatternRegistry {
        &self.registry
    }
}

#[async_trait::async_trait]
impl LlmProvider for RuleBasedProvider {
    async fn send_query(&self, query: &str, context: &QueryContext) -> Result<ResponseMessage, ProviderError> {
        Ok(self.process_query(query, context))
    }

    async fn test_connection(&self) -> bool {
        true
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Mock
    }
}
