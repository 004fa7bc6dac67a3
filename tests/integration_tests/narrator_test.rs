//! Ollama narrator tests against a mock server

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendscope::analytics::CategoryAnalyzer;
use trendscope::config::{AnalysisConfig, NarratorConfig};
use trendscope::llm::{InsightNarrator, NarrationError, OllamaNarrator, StructuredSummary};
use trendscope::source::InMemoryTrendSource;
use trendscope::Window;

use crate::common::{cooking_and_ai_tools, week_window};

fn narrator_for(server: &MockServer) -> OllamaNarrator {
    OllamaNarrator::new(NarratorConfig {
        enabled: true,
        endpoint: server.uri(),
        model: "test-model".to_string(),
        timeout_secs: 5,
        ..NarratorConfig::default()
    })
    .unwrap()
}

fn analyzer_with(narrator: OllamaNarrator, timeout_secs: u64) -> CategoryAnalyzer {
    CategoryAnalyzer::new(
        Arc::new(InMemoryTrendSource::new(cooking_and_ai_tools())),
        AnalysisConfig {
            narration_timeout_secs: timeout_secs,
            ..AnalysisConfig::default()
        },
    )
    .with_narrator(Arc::new(narrator))
}

fn relations_summary() -> StructuredSummary {
    StructuredSummary::Relations {
        platform: None,
        window: Window::week(15, 2024).unwrap(),
        correlations: vec![],
        clusters: vec![],
    }
}

#[tokio::test]
async fn test_narrated_category_insight() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"model": "test-model", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "```json\n{\"insight\": \"Strong week.\", \"subcategories\": [\"Prompting\", \"Agents\"]}\n```",
            "done": true
        })))
        .mount(&server)
        .await;

    let reports = analyzer_with(narrator_for(&server), 5)
        .analyze_categories(None, week_window())
        .await
        .unwrap();

    assert!(reports.iter().all(|r| !r.insight.is_fallback()));
    assert_eq!(reports[0].insight.text, "Strong week.");
    assert_eq!(reports[0].subcategories, vec!["Prompting", "Agents"]);
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let reports = analyzer_with(narrator_for(&server), 5)
        .analyze_categories(None, week_window())
        .await
        .unwrap();

    assert!(reports.iter().all(|r| r.insight.is_fallback()));
    assert_eq!(reports[0].subcategories, vec!["ai", "chatgpt"]);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "late", "done": true}))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let relations = analyzer_with(narrator_for(&server), 1)
        .analyze_category_relations(None, week_window())
        .await
        .unwrap();

    assert!(relations.insight.expect("two categories").is_fallback());
}

#[tokio::test]
async fn test_quota_exceeded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = narrator_for(&server)
        .narrate(&relations_summary())
        .await
        .unwrap_err();
    match err {
        NarrationError::Unavailable(reason) => assert!(reason.contains("quota exceeded")),
        other => panic!("Expected Unavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = narrator_for(&server)
        .narrate(&relations_summary())
        .await
        .unwrap_err();
    assert!(matches!(err, NarrationError::Malformed(_)));
}

#[tokio::test]
async fn test_availability_check() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    assert!(narrator_for(&server).is_available().await);

    let offline = OllamaNarrator::new(NarratorConfig {
        endpoint: "http://localhost:1".to_string(),
        timeout_secs: 1,
        ..NarratorConfig::default()
    })
    .unwrap();
    assert!(!offline.is_available().await);
}
