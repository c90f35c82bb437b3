use std::sync::Mutex;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use ai_dash_engine::config::{LlmConfig, ProviderKind};
use ai_dash_engine::models::conversation::QueryContext;
use ai_dash_engine::models::response::{ChartType, ResponseKind};
use ai_dash_engine::services::anthropic::{AnthropicProvider, API_VERSION};
use ai_dash_engine::services::openai::OpenAiProvider;
use ai_dash_engine::services::{create_provider, synthesizer, LlmProvider, ProviderError};

const API_KEY: &str = "test-key";

const STRUCTURED_REPLY: &str = r#"{
    "text": "Electronics leads all categories.",
    "chartConfig": {
        "type": "pie",
        "data": [{"name": "Electronics", "value": 427000}, {"name": "Clothing", "value": 245000}],
        "xKey": "name",
        "yKey": "value",
        "title": "Sales by Category"
    },
    "followUpSuggestions": ["Make it a bar chart"],
    "explanation": "Category share of total sales.",
    "interpretation": {
        "intent": "Show sales by category",
        "entities": ["sales", "category"],
        "dataSource": "sales",
        "assumptions": ["All regions included"]
    }
}"#;

/// Stand-in for a hosted LLM API
struct MockLlm {
    reply: String,
    requests: Mutex<Vec<Value>>,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

async fn chat_completions(
    req: HttpRequest,
    body: web::Json<Value>,
    state: web::Data<MockLlm>,
) -> HttpResponse {
    if header(&req, "authorization") != Some("Bearer test-key") {
        return HttpResponse::Unauthorized().body("invalid api key");
    }
    state.requests.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({
        "choices": [{ "message": { "role": "assistant", "content": state.reply } }]
    }))
}

async fn models(req: HttpRequest) -> HttpResponse {
    if header(&req, "authorization") != Some("Bearer test-key") {
        return HttpResponse::Unauthorized().body("invalid api key");
    }
    HttpResponse::Ok().json(json!({ "data": [] }))
}

async fn messages(req: HttpRequest, body: web::Json<Value>, state: web::Data<MockLlm>) -> HttpResponse {
    if header(&req, "x-api-key") != Some(API_KEY) || header(&req, "anthropic-version") != Some(API_VERSION) {
        return HttpResponse::Unauthorized().body("invalid x-api-key");
    }
    state.requests.lock().unwrap().push(body.into_inner());
    HttpResponse::Ok().json(json!({
        "content": [{ "type": "text", "text": state.reply }]
    }))
}

/// Start a mock API on an ephemeral port, returning its base URL
fn start_mock(reply: &str) -> (String, web::Data<MockLlm>) {
    let state = web::Data::new(MockLlm {
        reply: reply.to_string(),
        requests: Mutex::new(Vec::new()),
    });
    let data = state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .route("/v1/chat/completions", web::post().to(chat_completions))
            .route("/v1/models", web::get().to(models))
            .route("/v1/messages", web::post().to(messages))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    (format!("http://{}/v1", addr), state)
}

fn config(provider: ProviderKind, base_url: &str) -> LlmConfig {
    LlmConfig {
        provider,
        api_key: Some(API_KEY.to_string()),
        model: None,
        base_url: Some(base_url.to_string()),
        timeout_secs: 5,
    }
}

#[actix_web::test]
async fn openai_structured_reply_becomes_mixed_response() {
    let (base_url, state) = start_mock(STRUCTURED_REPLY);
    let provider = OpenAiProvider::new(&config(ProviderKind::OpenAi, &base_url), API_KEY).unwrap();

    let response = provider
        .send_query("Show sales by category", &QueryContext::default())
        .await
        .unwrap();

    assert_eq!(response.kind, ResponseKind::Mixed);
    let chart = response.chart.unwrap();
    assert_eq!(chart.chart_type, ChartType::Pie);
    assert_eq!(chart.data.len(), 2);
    assert_eq!(response.interpretation.data_source, "sales");
    assert_eq!(response.follow_up_suggestions, Some(vec!["Make it a bar chart".to_string()]));

    let requests = state.requests.lock().unwrap();
    let body = &requests[0];
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Show sales by category");
}

#[actix_web::test]
async fn openai_request_carries_previous_explanation() {
    let (base_url, state) = start_mock(STRUCTURED_REPLY);
    let provider = OpenAiProvider::new(&config(ProviderKind::OpenAi, &base_url), API_KEY).unwrap();
    let previous = synthesizer::monthly_revenue("Show monthly revenue", None);
    let context = QueryContext::with_last_response(Some(previous.clone()));

    provider.send_query("Make it a bar chart", &context).await.unwrap();

    let requests = state.requests.lock().unwrap();
    let turns = requests[0]["messages"].as_array().unwrap();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1]["role"], "assistant");
    assert_eq!(
        turns[1]["content"],
        format!("Previous response context: {}", previous.explanation)
    );
}

#[actix_web::test]
async fn unstructured_reply_degrades_to_text() {
    let (base_url, _state) = start_mock("Revenue grew steadily through the year.");
    let provider = OpenAiProvider::new(&config(ProviderKind::OpenAi, &base_url), API_KEY).unwrap();

    let response = provider
        .send_query("How did revenue do?", &QueryContext::default())
        .await
        .unwrap();

    assert_eq!(response.kind, ResponseKind::Text);
    assert_eq!(response.text.as_deref(), Some("Revenue grew steadily through the year."));
    assert_eq!(response.interpretation.intent, "General response");
    assert_eq!(response.interpretation.data_source, "LLM");
}

#[actix_web::test]
async fn rejected_key_surfaces_status_and_body() {
    let (base_url, _state) = start_mock(STRUCTURED_REPLY);
    let provider = OpenAiProvider::new(&config(ProviderKind::OpenAi, &base_url), "wrong-key").unwrap();

    let err = provider
        .send_query("Show sales by category", &QueryContext::default())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    match &err {
        ProviderError::Api { provider, body, .. } => {
            assert_eq!(*provider, "OpenAI");
            assert_eq!(body, "invalid api key");
        }
        other => panic!("expected API error, got {:?}", other),
    }
    assert_eq!(err.to_string(), "OpenAI API error: Status 401, Details: invalid api key");
}

#[actix_web::test]
async fn empty_content_is_an_error() {
    let (base_url, _state) = start_mock("   ");
    let provider = OpenAiProvider::new(&config(ProviderKind::OpenAi, &base_url), API_KEY).unwrap();

    let err = provider
        .send_query("Show sales by category", &QueryContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::EmptyContent { provider: "OpenAI" }));
}

#[actix_web::test]
async fn openai_connection_test_uses_models_endpoint() {
    let (base_url, _state) = start_mock(STRUCTURED_REPLY);

    let good = OpenAiProvider::new(&config(ProviderKind::OpenAi, &base_url), API_KEY).unwrap();
    assert!(good.test_connection().await);

    let bad = OpenAiProvider::new(&config(ProviderKind::OpenAi, &base_url), "wrong-key").unwrap();
    assert!(!bad.test_connection().await);
}

#[actix_web::test]
async fn unreachable_host_fails_connection_test() {
    let openai = OpenAiProvider::new(&config(ProviderKind::OpenAi, "http://127.0.0.1:1/v1"), API_KEY).unwrap();
    assert!(!openai.test_connection().await);

    let anthropic =
        AnthropicProvider::new(&config(ProviderKind::Anthropic, "http://127.0.0.1:1/v1"), API_KEY).unwrap();
    assert!(!anthropic.test_connection().await);

    let err = openai
        .send_query("Show sales by category", &QueryContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Http(_)));
}

#[actix_web::test]
async fn anthropic_sends_version_header_and_top_level_system() {
    let (base_url, state) = start_mock(STRUCTURED_REPLY);
    let provider = AnthropicProvider::new(&config(ProviderKind::Anthropic, &base_url), API_KEY).unwrap();

    let response = provider
        .send_query("Show sales by category", &QueryContext::default())
        .await
        .unwrap();
    assert_eq!(response.kind, ResponseKind::Mixed);
    assert_eq!(response.chart.unwrap().title, "Sales by Category");

    let requests = state.requests.lock().unwrap();
    let body = &requests[0];
    assert!(body["system"].as_str().unwrap().contains("analytics AI assistant"));
    assert_eq!(body["max_tokens"], 4096);
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");
}

#[actix_web::test]
async fn anthropic_connection_test_sends_short_probe() {
    let (base_url, state) = start_mock("Hello");
    let provider = AnthropicProvider::new(&config(ProviderKind::Anthropic, &base_url), API_KEY).unwrap();

    assert!(provider.test_connection().await);

    let requests = state.requests.lock().unwrap();
    assert_eq!(requests[0]["max_tokens"], 10);
    assert_eq!(requests[0]["messages"][0]["content"], "Hi");
}

#[actix_web::test]
async fn factory_builds_remote_provider_with_key() {
    let (base_url, _state) = start_mock(STRUCTURED_REPLY);

    let provider = create_provider(&config(ProviderKind::Anthropic, &base_url)).unwrap();
    assert_eq!(provider.kind(), ProviderKind::Anthropic);
    assert!(provider.test_connection().await);

    let mut keyless = config(ProviderKind::OpenAi, &base_url);
    keyless.api_key = Some("  ".to_string());
    let provider = create_provider(&keyless).unwrap();
    assert_eq!(provider.kind(), ProviderKind::Mock);
}
