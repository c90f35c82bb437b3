use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::fmt;
use uuid::Uuid;

/// A single cell in a chart data record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Integer(value)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::Text(value.to_string())
    }
}

impl DataValue {
    /// Name of the value's type as reported by dataset schemas
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Integer(_) | DataValue::Float(_) => "number",
            DataValue::Text(_) => "string",
        }
    }
}

/// One flat row of chart data. Every record in a chart shares the same keys,
/// kept in the order the table declares them.
pub type DataRecord = IndexMap<String, DataValue>;

/// Kind of response, derived from which payload fields are present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Text,
    Chart,
    Mixed,
}

impl ResponseKind {
    fn for_payload(has_chart: bool, has_text: bool) -> Self {
        match (has_chart, has_text) {
            (true, true) => ResponseKind::Mixed,
            (true, false) => ResponseKind::Chart,
            (false, _) => ResponseKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartType {
    Line,
    Bar,
    Area,
    Pie,
    Funnel,
    Scatter,
    Kpi,
    StackedBar,
    Table,
    Treemap,
}

impl ChartType {
    /// Whether the chart type stacks its series and therefore uses `stack_keys`
    pub fn is_stacked(&self) -> bool {
        matches!(self, ChartType::StackedBar)
    }

    /// Human-readable name used in response text ("bar chart", "stacked bar chart")
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Line => "line chart",
            ChartType::Bar => "bar chart",
            ChartType::Area => "area chart",
            ChartType::Pie => "pie chart",
            ChartType::Funnel => "funnel chart",
            ChartType::Scatter => "scatter plot",
            ChartType::Kpi => "KPI card",
            ChartType::StackedBar => "stacked bar chart",
            ChartType::Table => "table",
            ChartType::Treemap => "treemap",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Y-axis field(s). A list signals a multi-series chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisKey {
    Single(String),
    Multi(Vec<String>),
}

impl AxisKey {
    /// The axis fields in series order
    pub fn fields(&self) -> Vec<String> {
        match self {
            AxisKey::Single(key) => vec![key.clone()],
            AxisKey::Multi(keys) => keys.clone(),
        }
    }
}

impl From<&str> for AxisKey {
    fn from(value: &str) -> Self {
        AxisKey::Single(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Single aggregate shown by KPI charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiData {
    pub value: DataValue,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_label: Option<String>,
}

/// Structured description of a renderable chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Vec<DataRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_key: Option<AxisKey>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpi_data: Option<KpiData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_keys: Option<Vec<String>>,
}

impl ChartSpec {
    pub fn new(chart_type: ChartType, data: Vec<DataRecord>, title: &str) -> Self {
        Self {
            chart_type,
            data,
            x_key: None,
            y_key: None,
            title: title.to_string(),
            kpi_data: None,
            stack_keys: None,
        }
    }

    pub fn with_axes(mut self, x_key: &str, y_key: impl Into<AxisKey>) -> Self {
        self.x_key = Some(x_key.to_string());
        self.y_key = Some(y_key.into());
        self
    }

    pub fn with_kpi(mut self, kpi: KpiData) -> Self {
        self.kpi_data = Some(kpi);
        self
    }

    /// Same data, new view. Copies every field and overrides only the chart
    /// type; stacked types also take their stacking order from `y_key`.
    pub fn retyped(&self, chart_type: ChartType) -> Self {
        let stack_keys = if chart_type.is_stacked() {
            self.y_key.as_ref().map(AxisKey::fields).or_else(|| self.stack_keys.clone())
        } else {
            self.stack_keys.clone()
        };

        Self {
            chart_type,
            stack_keys,
            ..self.clone()
        }
    }
}

/// How the engine understood the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInterpretation {
    pub intent: String,
    #[serde(default)]
    pub entities: Vec<String>,
    pub data_source: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
}

impl QueryInterpretation {
    pub fn new(intent: &str, entities: &[&str], data_source: &str, assumptions: &[&str]) -> Self {
        Self {
            intent: intent.to_string(),
            entities: entities.iter().map(|e| e.to_string()).collect(),
            data_source: data_source.to_string(),
            assumptions: assumptions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// The unit produced by the engine for every query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub explanation: String,
    pub interpretation: QueryInterpretation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_suggestions: Option<Vec<String>>,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMessage {
    /// Build a response, deriving `kind` from the payload that is present
    pub fn new(
        chart: Option<ChartSpec>,
        text: Option<String>,
        explanation: impl Into<String>,
        interpretation: QueryInterpretation,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: ResponseKind::for_payload(chart.is_some(), text.is_some()),
            chart,
            text,
            explanation: explanation.into(),
            interpretation,
            follow_up_suggestions: None,
            timestamp: Utc::now(),
        }
    }

    pub fn text(
        text: impl Into<String>,
        explanation: impl Into<String>,
        interpretation: QueryInterpretation,
    ) -> Self {
        Self::new(None, Some(text.into()), explanation, interpretation)
    }

    pub fn mixed(
        chart: ChartSpec,
        text: impl Into<String>,
        explanation: impl Into<String>,
        interpretation: QueryInterpretation,
    ) -> Self {
        Self::new(Some(chart), Some(text.into()), explanation, interpretation)
    }

    pub fn with_follow_ups(mut self, suggestions: &[&str]) -> Self {
        self.follow_up_suggestions = Some(suggestions.iter().map(|s| s.to_string()).collect());
        self
    }

    /// User-visible notice for a failed provider call
    pub fn error(detail: impl fmt::Display) -> Self {
        Self::text(
            format!("Sorry, I couldn't process that query: {}", detail),
            "The analytics provider returned an error, so no analysis could be produced for this query.",
            QueryInterpretation::new(
                "Error handling",
                &[],
                "N/A",
                &["The request failed before a response could be generated"],
            ),
        )
    }
}

/// Error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status_code: u16,
}
