use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::response::{ChartSpec, ResponseMessage};

/// Context handed to a provider alongside the query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryContext {
    /// The previous response in the same conversation, used for iteration
    #[serde(default)]
    pub last_response: Option<ResponseMessage>,
    /// Names of datasets the caller has available
    #[serde(default)]
    pub available_datasets: Vec<String>,
}

impl QueryContext {
    pub fn with_last_response(last_response: Option<ResponseMessage>) -> Self {
        Self {
            last_response,
            available_datasets: Vec::new(),
        }
    }
}

/// Represents a user query and the engine's response in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub id: String,
    /// The user's natural language query
    pub user_query: String,
    pub response: ResponseMessage,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(user_query: String, response: ResponseMessage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_query,
            response,
            timestamp: Utc::now(),
        }
    }
}

/// A conversation thread kept by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub history: Vec<ConversationTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Response of the most recent turn, if any
    pub fn last_response(&self) -> Option<&ResponseMessage> {
        self.history.last().map(|turn| &turn.response)
    }

    pub fn add_turn(&mut self, query: String, response: ResponseMessage) {
        self.history.push(ConversationTurn::new(query, response));
        self.updated_at = Utc::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Request body for `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    /// Continue a stored conversation; its latest response becomes the context
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// Previous response supplied directly by the caller. Ignored when the
    /// conversation already has history.
    #[serde(default)]
    pub last_response: Option<ResponseMessage>,
    #[serde(default)]
    pub available_datasets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub conversation_id: String,
    pub response: ResponseMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorySectionKind {
    Heading,
    Text,
    Chart,
    Insight,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySection {
    #[serde(rename = "type")]
    pub kind: StorySectionKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

/// Report assembled from a conversation's history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataStory {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<StorySection>,
}
