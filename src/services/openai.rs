use std::time::Duration;
use log::{info, error, debug};
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::{LlmConfig, ProviderKind};
use crate::models::conversation::QueryContext;
use crate::models::llm::LlmResponse;
use crate::models::response::ResponseMessage;
use crate::services::provider::ProviderError;
use crate::services::remote::{self, ChatTurn};
use crate::services::LlmProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const PROVIDER: &str = "OpenAI";

/// Chat-completions backed provider
#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
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

        info!("OpenAI provider initialized with model {} at {}", model, base_url);
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            model,
            base_url,
        })
    }

    /// Request body: system turn, optional prior context, then the query
    pub fn request_body(&self, query: &str, context: &QueryContext) -> Value {
        let mut messages = vec![ChatTurn::system(remote::system_prompt(context))];
        messages.extend(remote::conversation_turns(query, context));

        json!({
            "model": self.model,
            "messages": messages,
            "response_format": { "type": "json_object" },
            "temperature": 0.7
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn send_query(&self, query: &str, context: &QueryContext) -> Result<ResponseMessage, ProviderError> {
        info!("Sending request to OpenAI API with model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(query, context))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to OpenAI API: {}", e);
                e
            })?;

        let response_json = remote::read_json(PROVIDER, response).await?;
        debug!("OpenAI API response received");

        let content = match response_json["choices"][0]["message"]["content"].as_str() {
            Some(content) if !content.trim().is_empty() => content,
            _ => {
                error!("Could not extract content from OpenAI response: {:?}", response_json);
                return Err(ProviderError::EmptyContent { provider: PROVIDER });
            }
        };

        Ok(LlmResponse::from_content(content).into_response_message())
    }

    async fn test_connection(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("OpenAI connection test failed: {}", e);
                false
            }
        }
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }
}
