pub mod anthropic;
pub mod conversation;
pub mod datasets;
pub mod iteration;
pub mod openai;
pub mod patterns;
pub mod provider;
pub mod remote;
pub mod rule_based;
pub mod story;
pub mod synthesizer;

use crate::config::ProviderKind;
use crate::models::conversation::QueryContext;
use crate::models::response::ResponseMessage;

pub use provider::{create_provider, ProviderError, ProviderHandle};

/// A backend that turns a query plus context into a response. Every
/// implementation returns the same `ResponseMessage` contract.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync + 'static {
    /// Answer a query. Only transport and HTTP status failures are errors;
    /// unstructured model output is returned as a degraded text response.
    async fn send_query(&self, query: &str, context: &QueryContext) -> Result<ResponseMessage, ProviderError>;

    /// Health probe. Never fails, unreachable or rejected means `false`.
    async fn test_connection(&self) -> bool;

    fn kind(&self) -> ProviderKind;
}

pub use conversation::{ConversationService, ConversationStore};
pub use rule_based::RuleBasedProvider;
