use std::time::Duration;
use log::{info, error, debug};
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use crate::config::{LlmConfig, ProviderKind};
use crate::models::conversation::QueryContext;
use crate::models::llm::LlmResponse;
use crate::models::response::ResponseMessage;
use crate::services::provider::ProviderError;
use crate::services::remote::{self, ChatTurn};
use crate::services::LlmProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const API_VERSION: &str = "2023-06-01";

const PROVIDER: &str = "Anthropic";
const MAX_TOKENS: u32 = 4096;

/// Messages-API backed provider. The system prompt travels as a top-level
/// field rather than as a turn.
#[derive(Clone, Debug)]
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(config: &LlmConfig, api_key: &str) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let model = config.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        info!("Anthropic provider initialized with model {} at {}", model, base_url);
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model,
            base_url,
        })
    }

    fn post_messages(&self, body: &Value) -> RequestBuilder {
        self.client
            .post(format!("{}/messages", self.base_url))
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(body)
    }

    pub fn request_body(&self, query: &str, context: &QueryContext) -> Value {
        let messages: Vec<ChatTurn> = remote::conversation_turns(query, context);

        json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": remote::system_prompt(context),
            "messages": messages
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn send_query(&self, query: &str, context: &QueryContext) -> Result<ResponseMessage, ProviderError> {
        info!("Sending request to Anthropic API with model: {}", self.model);

        let response = self
            .post_messages(&self.request_body(query, context))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to Anthropic API: {}", e);
                e
            })?;

        let response_json = remote::read_json(PROVIDER, response).await?;
        debug!("Anthropic API response received");

        let content = match response_json["content"][0]["text"].as_str() {
            Some(content) if !content.trim().is_empty() => content,
            _ => {
                error!("Could not extract content from Anthropic response: {:?}", response_json);
                return Err(ProviderError::EmptyContent { provider: PROVIDER });
            }
        };

        Ok(LlmResponse::from_content(content).into_response_message())
    }

    async fn test_connection(&self) -> bool {
        let probe = json!({
            "model": self.model,
            "max_tokens": 10,
            "messages": [ChatTurn::user("Hi")]
        });

        match self.post_messages(&probe).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Anthropic connection test failed: {}", e);
                false
            }
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_is_top_level() {
        let config = LlmConfig {
            provider: ProviderKind::Anthropic,
            ..LlmConfig::default()
        };
        let provider = AnthropicProvider::new(&config, "key").unwrap();
        let body = provider.request_body("Show monthly revenue", &QueryContext::default());

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["system"], remote::SYSTEM_PROMPT);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Show monthly revenue");
    }
}
