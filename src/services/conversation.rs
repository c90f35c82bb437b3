use std::sync::{Arc, Mutex};
use std::collections::HashMap;
use anyhow::{Result, anyhow};
use log::{info, warn, error};

use crate::config::{LlmConfig, ProviderKind};
use crate::models::conversation::{Conversation, DataStory, QueryContext, QueryRequest, QueryResponse};
use crate::models::response::ResponseMessage;
use crate::services::datasets;
use crate::services::provider::ProviderHandle;
use crate::services::story;

/// Conversations kept before the least recently updated one is dropped
pub const MAX_CONVERSATIONS: usize = 1000;

/// In-memory store for conversation threads
#[derive(Debug, Clone)]
pub struct ConversationStore {
    conversations: Arc<Mutex<HashMap<String, Conversation>>>,
    capacity: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::with_capacity(MAX_CONVERSATIONS)
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            conversations: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Store a conversation, replacing any previous version. A new
    /// conversation in a full store evicts the least recently updated one.
    pub fn store(&self, conversation: Conversation) -> Result<()> {
        let mut conversations = self.conversations.lock()
            .map_err(|_| anyhow!("Failed to acquire lock on conversations"))?;

        if !conversations.contains_key(&conversation.id) && conversations.len() >= self.capacity {
            let oldest = conversations
                .values()
                .min_by_key(|c| c.updated_at)
                .map(|c| c.id.clone());
            if let Some(oldest) = oldest {
                info!("Conversation store full, evicting {}", oldest);
                conversations.remove(&oldest);
            }
        }

        conversations.insert(conversation.id.clone(), conversation);
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let conversations = self.conversations.lock()
            .map_err(|_| anyhow!("Failed to acquire lock on conversations"))?;
        Ok(conversations.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Get a conversation by ID
    pub fn get(&self, id: &str) -> Result<Option<Conversation>> {
        let conversations = self.conversations.lock()
            .map_err(|_| anyhow!("Failed to acquire lock on conversations"))?;

        Ok(conversations.get(id).cloned())
    }
}

/// Entry point for callers: routes queries to the configured provider and
/// keeps conversation history so each query sees the previous response.
#[derive(Debug, Clone)]
pub struct ConversationService {
    store: ConversationStore,
    providers: Arc<ProviderHandle>,
}

impl ConversationService {
    pub fn new(config: LlmConfig) -> Self {
        Self {
            store: ConversationStore::new(),
            providers: Arc::new(ProviderHandle::new(config)),
        }
    }

    /// Send one query to the current provider. Transport failures propagate.
    pub async fn process_query(&self, query: &str, context: &QueryContext) -> Result<ResponseMessage> {
        let provider = self.providers.get()?;
        info!("Processing query with {} provider: {}", provider.kind(), query);
        Ok(provider.send_query(query, context).await?)
    }

    /// Like `process_query`, but failures become a user-visible error response
    pub async fn respond(&self, query: &str, context: &QueryContext) -> ResponseMessage {
        match self.process_query(query, context).await {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to process query '{}': {}", query, e);
                ResponseMessage::error(e)
            }
        }
    }

    /// Answer a query within a conversation, creating the conversation if needed.
    /// Turns of one conversation are expected one at a time: the history is
    /// read, extended and written back without holding the store lock, so two
    /// concurrent turns on the same id keep only the last one written.
    pub async fn handle_request(&self, request: QueryRequest) -> Result<QueryResponse> {
        let mut conversation = match &request.conversation_id {
            Some(id) => match self.store.get(id)? {
                Some(conversation) => {
                    info!("Found existing conversation: {}", id);
                    conversation
                }
                None => {
                    warn!("Conversation ID not found: {}, creating new", id);
                    Conversation::new()
                }
            },
            None => Conversation::new(),
        };

        let last_response = conversation
            .last_response()
            .cloned()
            .or(request.last_response);

        let available_datasets = if request.available_datasets.is_empty() {
            datasets::list_datasets()
        } else {
            request.available_datasets
        };

        let context = QueryContext {
            last_response,
            available_datasets,
        };

        let response = self.respond(&request.query, &context).await;
        conversation.add_turn(request.query, response.clone());

        let conversation_id = conversation.id.clone();
        self.store.store(conversation)?;

        Ok(QueryResponse {
            conversation_id,
            response,
        })
    }

    /// Report built from a stored conversation
    pub fn story(&self, conversation_id: &str, title: Option<&str>) -> Result<Option<DataStory>> {
        Ok(self
            .store
            .get(conversation_id)?
            .map(|conversation| story::generate_story(&conversation.history, title)))
    }

    pub async fn test_connection(&self) -> Result<(ProviderKind, bool)> {
        let provider = self.providers.get()?;
        Ok((provider.kind(), provider.test_connection().await))
    }

    /// Switch provider settings; the next query builds a fresh provider
    pub fn reconfigure(&self, config: LlmConfig) -> Result<()> {
        self.providers.reconfigure(config)
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::response::{ChartType, ResponseKind};

    fn request(query: &str, conversation_id: Option<String>) -> QueryRequest {
        QueryRequest {
            query: query.to_string(),
            conversation_id,
            last_response: None,
            available_datasets: Vec::new(),
        }
    }

    #[actix_web::test]
    async fn conversation_feeds_previous_response_into_iteration() {
        let service = ConversationService::new(LlmConfig::default());

        let first = service
            .handle_request(request("Show me sales over the last quarter", None))
            .await
            .unwrap();
        let second = service
            .handle_request(request("Make it a bar chart", Some(first.conversation_id.clone())))
            .await
            .unwrap();

        assert_eq!(second.conversation_id, first.conversation_id);
        let chart = second.response.chart.unwrap();
        assert_eq!(chart.chart_type, ChartType::Bar);
        assert_eq!(chart.data, first.response.chart.unwrap().data);

        let stored = service.store().get(&first.conversation_id).unwrap().unwrap();
        assert_eq!(stored.history.len(), 2);
    }

    #[actix_web::test]
    async fn unknown_conversation_starts_fresh() {
        let service = ConversationService::new(LlmConfig::default());
        let response = service
            .handle_request(request("Make it a bar chart", Some("missing".to_string())))
            .await
            .unwrap();

        assert_ne!(response.conversation_id, "missing");
        assert_eq!(response.response.kind, ResponseKind::Text);
    }

    #[actix_web::test]
    async fn caller_supplied_last_response_is_used_for_new_conversations() {
        let service = ConversationService::new(LlmConfig::default());
        let previous = service.respond("Show sales by category", &QueryContext::default()).await;

        let mut req = request("Make it a bar chart", None);
        req.last_response = Some(previous);
        let response = service.handle_request(req).await.unwrap();
        assert_eq!(response.response.chart.unwrap().chart_type, ChartType::Bar);
    }

    #[actix_web::test]
    async fn parallel_conversations_stay_separate() {
        let service = ConversationService::new(LlmConfig::default());
        let (sales, traffic) = tokio::join!(
            service.handle_request(request("Show sales by category", None)),
            service.handle_request(request("Show website traffic trends", None)),
        );
        let (sales, traffic) = (sales.unwrap(), traffic.unwrap());
        assert_ne!(sales.conversation_id, traffic.conversation_id);

        let (sales_bar, traffic_bar) = tokio::join!(
            service.handle_request(request("Make it a bar chart", Some(sales.conversation_id.clone()))),
            service.handle_request(request("Make it a bar chart", Some(traffic.conversation_id.clone()))),
        );
        assert_eq!(sales_bar.unwrap().response.chart.unwrap().data, sales.response.chart.unwrap().data);
        assert_eq!(traffic_bar.unwrap().response.chart.unwrap().data, traffic.response.chart.unwrap().data);
    }

    #[actix_web::test]
    async fn transport_failure_becomes_error_turn() {
        let service = ConversationService::new(LlmConfig {
            provider: ProviderKind::OpenAi,
            api_key: Some("test-key".to_string()),
            model: None,
            base_url: Some("http://127.0.0.1:1/v1".to_string()),
            timeout_secs: 5,
        });

        let result = service
            .handle_request(request("Show monthly revenue", None))
            .await
            .unwrap();

        let response = &result.response;
        assert_eq!(response.kind, ResponseKind::Text);
        assert!(response.chart.is_none());
        assert!(response.text.as_deref().unwrap().starts_with("Sorry, I couldn't process that query:"));
        assert_eq!(response.interpretation.intent, "Error handling");
        assert_eq!(response.interpretation.data_source, "N/A");

        let stored = service.store().get(&result.conversation_id).unwrap().unwrap();
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.history[0].response.interpretation.intent, "Error handling");
    }

    fn conversation_updated(seconds_ago: i64) -> Conversation {
        let mut conversation = Conversation::new();
        conversation.updated_at = chrono::Utc::now() - chrono::Duration::seconds(seconds_ago);
        conversation
    }

    #[test]
    fn full_store_evicts_least_recently_updated() {
        let store = ConversationStore::with_capacity(2);
        let stale = conversation_updated(60);
        let recent = conversation_updated(10);
        store.store(stale.clone()).unwrap();
        store.store(recent.clone()).unwrap();

        // Updating a stored conversation never evicts
        store.store(recent.clone()).unwrap();
        assert_eq!(store.len().unwrap(), 2);

        let newest = conversation_updated(0);
        store.store(newest.clone()).unwrap();

        assert_eq!(store.len().unwrap(), 2);
        assert!(store.get(&stale.id).unwrap().is_none());
        assert!(store.get(&recent.id).unwrap().is_some());
        assert!(store.get(&newest.id).unwrap().is_some());
    }

    #[actix_web::test]
    async fn story_for_unknown_conversation_is_none() {
        let service = ConversationService::new(LlmConfig::default());
        assert!(service.story("nope", None).unwrap().is_none());
    }

    #[actix_web::test]
    async fn rule_based_provider_is_always_connected() {
        let service = ConversationService::new(LlmConfig::default());
        assert_eq!(service.test_connection().await.unwrap(), (ProviderKind::Mock, true));
    }
}
