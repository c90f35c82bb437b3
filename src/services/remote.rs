use reqwest::Response;
use serde::Serialize;
use serde_json::Value;

use crate::models::conversation::QueryContext;
use crate::services::provider::ProviderError;

pub const SYSTEM_PROMPT: &str = r#"You are an analytics AI assistant. Analyze data queries and respond with JSON matching this exact structure:
{
  "text": "Brief text summary of findings (optional)",
  "chartConfig": {
    "type": "line|bar|area|pie|funnel|scatter|kpi|stackedBar|table|treemap",
    "data": [{"key": "value", ...}],
    "xKey": "field name for x-axis",
    "yKey": "field name for y-axis (or array for multi-series)",
    "title": "Chart title"
  },
  "followUpSuggestions": ["suggestion 1", "suggestion 2"],
  "explanation": "Detailed insight about the data",
  "interpretation": {
    "intent": "What the user is asking",
    "entities": ["entity1", "entity2"],
    "dataSource": "Source of data",
    "assumptions": ["assumption1"]
  }
}
Only include chartConfig if a visualization is appropriate. Always include explanation and interpretation. Respond with ONLY the JSON object, no markdown."#;

/// One role-tagged conversation turn on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: &'static str,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }
}

/// System prompt, extended with the caller's dataset names when present
pub fn system_prompt(context: &QueryContext) -> String {
    if context.available_datasets.is_empty() {
        SYSTEM_PROMPT.to_string()
    } else {
        format!(
            "{}\nAvailable datasets: {}.",
            SYSTEM_PROMPT,
            context.available_datasets.join(", ")
        )
    }
}

/// Prior-context turn followed by the user's query. Only the previous
/// explanation is forwarded, never the full structured payload.
pub fn conversation_turns(query: &str, context: &QueryContext) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(2);

    if let Some(last) = &context.last_response {
        turns.push(ChatTurn::assistant(format!(
            "Previous response context: {}",
            last.explanation
        )));
    }

    turns.push(ChatTurn::user(query));
    turns
}

/// Fail with status and body for non-2xx responses, otherwise decode JSON
pub async fn read_json(provider: &'static str, response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    log::info!("{} API response status: {}", provider, status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        log::error!("{} API error: Status {}, Details: {}", provider, status, body);
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<Value>().await?)
}
