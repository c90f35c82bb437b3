use pretty_assertions::assert_eq;

use ai_dash_engine::models::conversation::QueryContext;
use ai_dash_engine::models::response::{AxisKey, ChartType, ResponseKind, ResponseMessage};
use ai_dash_engine::services::iteration::NO_PREVIOUS_CHART;
use ai_dash_engine::services::patterns::PatternRegistry;
use ai_dash_engine::services::synthesizer::{EXAMPLE_QUERIES, FALLBACK_INTENT};
use ai_dash_engine::services::{LlmProvider, RuleBasedProvider};

fn engine() -> RuleBasedProvider {
    RuleBasedProvider::new().unwrap()
}

fn ask(query: &str) -> ResponseMessage {
    engine().process_query(query, &QueryContext::default())
}

fn ask_after(query: &str, previous: ResponseMessage) -> ResponseMessage {
    engine().process_query(query, &QueryContext::with_last_response(Some(previous)))
}

/// Everything except the per-call identifier and timestamp
fn content(message: &ResponseMessage) -> serde_json::Value {
    let mut value = serde_json::to_value(message).unwrap();
    let object = value.as_object_mut().unwrap();
    object.remove("id");
    object.remove("timestamp");
    value
}

#[test]
fn quarterly_sales_is_a_line_chart() {
    let response = ask("Show me sales over the last quarter");
    assert_eq!(response.kind, ResponseKind::Mixed);
    let chart = response.chart.unwrap();
    assert_eq!(chart.chart_type, ChartType::Line);
    assert!(chart.title.contains("Quarterly"), "title was {}", chart.title);
}

#[test]
fn monthly_revenue_is_a_bar_chart_by_month() {
    let response = ask("Show monthly revenue");
    assert_eq!(response.kind, ResponseKind::Mixed);
    let chart = response.chart.unwrap();
    assert_eq!(chart.chart_type, ChartType::Bar);
    assert_eq!(chart.x_key.as_deref(), Some("month"));
}

#[test]
fn conversion_without_previous_chart_explains_itself() {
    let response = ask("Make it a bar chart");
    assert_eq!(response.kind, ResponseKind::Text);
    assert!(response.chart.is_none());
    assert_eq!(response.text.as_deref(), Some(NO_PREVIOUS_CHART));
    assert_eq!(response.interpretation.data_source, "previous response");
    assert!(!response.interpretation.assumptions.is_empty());
}

#[test]
fn conversion_keeps_previous_data() {
    let quarterly = ask("Show me sales over the last quarter");
    let response = ask_after("Make it a bar chart", quarterly.clone());

    assert_eq!(response.kind, ResponseKind::Mixed);
    let before = quarterly.chart.unwrap();
    let after = response.chart.unwrap();
    assert_eq!(after.chart_type, ChartType::Bar);
    assert_eq!(after.data, before.data);
    assert_eq!(response.interpretation.data_source, quarterly.interpretation.data_source);
}

#[test]
fn unknown_query_lists_examples() {
    let response = ask("Tell me a joke");
    assert_eq!(response.kind, ResponseKind::Text);
    assert_eq!(response.interpretation.intent, FALLBACK_INTENT);
    assert_eq!(response.interpretation.data_source, "N/A");
    assert!(response.interpretation.entities.is_empty());

    let text = response.text.unwrap();
    assert!(text.contains("Tell me a joke"));
    for example in EXAMPLE_QUERIES {
        assert!(text.contains(example), "fallback text is missing '{}'", example);
    }
}

#[test]
fn sales_by_category_is_a_pie_chart() {
    let response = ask("Show sales by category");
    assert_eq!(response.kind, ResponseKind::Mixed);
    assert_eq!(response.chart.unwrap().chart_type, ChartType::Pie);
}

#[test]
fn same_intent_gives_same_content() {
    for query in EXAMPLE_QUERIES {
        let first = ask(query);
        let second = ask(query);
        assert_ne!(first.id, second.id);
        assert_eq!(content(&first), content(&second), "'{}' is not deterministic", query);
    }

    // Two phrasings of the same intent
    assert_eq!(content(&ask("Show sales by category")), content(&ask("Give me a category breakdown")));
}

#[test]
fn any_input_gets_a_response() {
    let inputs = [
        "",
        "   ",
        "?",
        "ñandú 🚀",
        "SELECT * FROM users; DROP TABLE sales",
        "(((unbalanced",
        "What is the weather tomorrow",
    ];
    for input in inputs {
        let response = ask(input);
        assert_eq!(response.interpretation.intent, FALLBACK_INTENT, "input '{}'", input);
        assert!(!response.explanation.is_empty());
    }
}

#[test]
fn every_conversion_preserves_every_chart() {
    let conversions = [
        ("Make it a bar chart", ChartType::Bar),
        ("Show as area chart", ChartType::Area),
        ("Make it a line chart", ChartType::Line),
        ("Make it a pie chart", ChartType::Pie),
        ("Make it a stacked bar chart", ChartType::StackedBar),
    ];

    for query in EXAMPLE_QUERIES {
        let original = ask(query);
        let Some(before) = original.chart.clone() else {
            continue;
        };

        for (conversion, target) in conversions {
            let converted = ask_after(conversion, original.clone());
            let after = converted.chart.unwrap();
            assert_eq!(after.chart_type, target, "'{}' after '{}'", conversion, query);
            assert_eq!(after.data, before.data);
            assert_eq!(after.x_key, before.x_key);
            assert_eq!(after.y_key, before.y_key);
            assert_eq!(after.title, before.title);
            assert_eq!(converted.interpretation.data_source, original.interpretation.data_source);
        }
    }
}

#[test]
fn stacked_conversion_stacks_every_series() {
    let comparison = ask("Compare revenue and profit by quarter");
    assert_eq!(
        comparison.chart.as_ref().unwrap().y_key,
        Some(AxisKey::Multi(vec!["revenue".to_string(), "profit".to_string()]))
    );

    let stacked = ask_after("Make it a stacked bar chart", comparison).chart.unwrap();
    assert_eq!(stacked.stack_keys, Some(vec!["revenue".to_string(), "profit".to_string()]));
}

#[test]
fn every_conversion_needs_a_chart() {
    let text_only = ask("Tell me a joke");
    for conversion in ["Make it a bar chart", "Show as area chart", "Make it a line chart", "Make it a pie chart", "Make it a stacked bar chart"] {
        assert_eq!(ask(conversion).text.as_deref(), Some(NO_PREVIOUS_CHART));
        assert_eq!(ask_after(conversion, text_only.clone()).text.as_deref(), Some(NO_PREVIOUS_CHART));
    }
}

#[test]
fn responses_are_always_complete() {
    let registry = PatternRegistry::standard().unwrap();
    let mut responses: Vec<ResponseMessage> = registry
        .entries()
        .flat_map(|entry| entry.examples().iter())
        .map(|example| ask(example))
        .collect();
    let chart = ask("Show monthly revenue");
    responses.push(ask_after("Make it a pie chart", chart));

    for response in responses {
        assert!(!response.explanation.trim().is_empty());
        assert!(!response.interpretation.intent.is_empty());
        assert!(!response.interpretation.data_source.is_empty());
        let expected = match (&response.chart, &response.text) {
            (Some(_), Some(_)) => ResponseKind::Mixed,
            (Some(_), None) => ResponseKind::Chart,
            _ => ResponseKind::Text,
        };
        assert_eq!(response.kind, expected);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["interpretation"]["entities"].is_array());
        assert!(json["interpretation"]["assumptions"].is_array());
    }
}

#[test]
fn specific_question_beats_generic_trigger_words() {
    let response = ask("Why did sales drop in Q3?");
    assert_ne!(response.interpretation.intent, ask("Show me sales over the last quarter").interpretation.intent);
    assert!(response.interpretation.data_source.contains("sales"));
}

#[actix_web::test]
async fn provider_interface_matches_direct_dispatch() {
    let engine = engine();
    let context = QueryContext::default();
    let via_trait = engine.send_query("Show monthly revenue", &context).await.unwrap();
    assert_eq!(content(&via_trait), content(&engine.process_query("Show monthly revenue", &context)));
    assert!(engine.test_connection().await);
}
