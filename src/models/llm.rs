use serde::{Deserialize, Serialize};

use crate::models::response::{AxisKey, ChartSpec, ChartType, DataRecord, QueryInterpretation, ResponseMessage};

/// Chart block requested from remote providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmChartConfig {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Vec<DataRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_key: Option<AxisKey>,
    pub title: String,
}

/// Structured payload a remote provider is asked to return.
/// Same shape as `ResponseMessage` minus `id` and `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_config: Option<LlmChartConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_suggestions: Option<Vec<String>>,
    pub explanation: String,
    pub interpretation: QueryInterpretation,
}

impl LlmResponse {
    /// Parse raw model output. Content that is not a JSON object of the
    /// expected shape is kept as plain text instead of failing.
    pub fn from_content(content: &str) -> Self {
        match serde_json::from_str::<LlmResponse>(content.trim()) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("LLM content was not structured JSON ({}), using raw text", e);
                Self::unstructured(content)
            }
        }
    }

    fn unstructured(content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            chart_config: None,
            follow_up_suggestions: None,
            explanation: content.to_string(),
            interpretation: QueryInterpretation::new(
                "General response",
                &[],
                "LLM",
                &["Response was not structured JSON"],
            ),
        }
    }

    /// Normalize into the response contract consumed by callers
    pub fn into_response_message(self) -> ResponseMessage {
        let chart = self.chart_config.map(|config| ChartSpec {
            chart_type: config.chart_type,
            data: config.data,
            x_key: config.x_key,
            y_key: config.y_key,
            title: config.title,
            kpi_data: None,
            stack_keys: None,
        });

        let mut message = ResponseMessage::new(chart, self.text, self.explanation, self.interpretation);
        message.follow_up_suggestions = self.follow_up_suggestions;
        message
    }
}
