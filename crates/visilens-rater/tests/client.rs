//! Integration tests for `RaterClient::query_opinion` and `query_raters`.
//!
//! Uses `wiremock` to stand up a local OpenRouter double for each test so no
//! real network traffic is made.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use visilens_core::ContentDocument;
use visilens_rater::{query_raters, RaterClient, RaterError};

fn test_client(base_url: &str) -> RaterClient {
    RaterClient::with_base_url("test-key", 5, base_url)
        .expect("failed to build test RaterClient")
}

fn sample_content() -> ContentDocument {
    ContentDocument {
        url: "https://acme.test/".to_string(),
        title: "Acme Widgets".to_string(),
        description: "Industrial widgets.".to_string(),
        paragraphs: vec!["Widgets for every industry.".to_string()],
        keywords: vec!["widgets".to_string()],
        meta_tags: std::collections::BTreeMap::new(),
        links: vec![],
        full_text: "Acme widgets text".to_string(),
    }
}

/// Wraps an opinion object in the chat-completions envelope, with the opinion
/// serialized into the message content the way OpenRouter returns it.
fn completion_with(opinion: &serde_json::Value) -> serde_json::Value {
    json!({
        "id": "gen-123",
        "choices": [
            { "message": { "role": "assistant", "content": opinion.to_string() } }
        ]
    })
}

fn full_opinion() -> serde_json::Value {
    json!({
        "sentiment": { "score": 0.7, "assessment": "mostly positive" },
        "visibility": { "score": 61, "assessment": "moderate" },
        "mentions": { "count": 3, "contexts": ["product roundup", "forum thread"] },
        "keywords": ["widgets", "fasteners"],
        "strengths": ["clear docs"],
        "weaknesses": ["thin blog"],
        "technicalIssues": ["missing sitemap"],
        "contentRecommendations": ["add FAQ section"],
        "competitiveInsights": "niche leader"
    })
}

// ---------------------------------------------------------------------------
// query_opinion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_opinion_parses_full_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&completion_with(&full_opinion())))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.query_opinion("openai/gpt-4o", "prompt").await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let payload = result.unwrap();
    assert_eq!(payload.sentiment.score, 0.7);
    assert_eq!(payload.visibility.score, 61.0);
    assert_eq!(payload.mentions.count, 3);
    assert_eq!(payload.mentions.contexts.len(), 2);
    assert_eq!(payload.keywords, vec!["widgets", "fasteners"]);
    assert_eq!(payload.technical_issues, vec!["missing sitemap"]);
}

#[tokio::test]
async fn query_opinion_coalesces_partial_payload() {
    let server = MockServer::start().await;

    let partial = json!({ "strengths": ["good structure"], "visibility": { "score": 40 } });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&completion_with(&partial)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let payload = client.query_opinion("openai/gpt-4o", "prompt").await.unwrap();

    assert_eq!(payload.strengths, vec!["good structure"]);
    assert_eq!(payload.visibility.score, 40.0);
    assert_eq!(payload.visibility.assessment, "");
    assert_eq!(payload.sentiment.score, 0.0);
    assert_eq!(payload.mentions.count, 0);
    assert!(payload.weaknesses.is_empty());
    assert_eq!(payload.competitive_insights, "");
}

#[tokio::test]
async fn query_opinion_rejects_non_json_content() {
    let server = MockServer::start().await;

    let body = json!({
        "choices": [
            { "message": { "role": "assistant", "content": "Sorry, I cannot analyze this." } }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.query_opinion("openai/gpt-4o", "prompt").await;

    assert!(
        matches!(result, Err(RaterError::MalformedOpinion { .. })),
        "expected MalformedOpinion, got: {result:?}"
    );
}

#[tokio::test]
async fn query_opinion_rejects_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.query_opinion("openai/gpt-4o", "prompt").await;

    assert!(
        matches!(result, Err(RaterError::EmptyCompletion { .. })),
        "expected EmptyCompletion, got: {result:?}"
    );
}

#[tokio::test]
async fn query_opinion_surfaces_non_2xx_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string(r#"{"error":"rate limited"}"#),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.query_opinion("openai/gpt-4o", "prompt").await;

    match result {
        Err(RaterError::UnexpectedStatus { status, body, .. }) => {
            assert_eq!(status, 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn query_opinion_sends_json_object_response_format() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "model": "openai/gpt-4o",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&completion_with(&full_opinion())))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.query_opinion("openai/gpt-4o", "prompt").await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

// ---------------------------------------------------------------------------
// query_raters: fan-out semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_raters_returns_opinions_in_request_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "openai/gpt-4o" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&completion_with(&full_opinion())))
        .mount(&server)
        .await;

    let gemini = json!({ "visibility": { "score": 30, "assessment": "low" } });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "google/gemini-2.5-flash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&completion_with(&gemini)))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ids = vec!["chatgpt-4o".to_string(), "gemini-2.5".to_string()];
    let opinions = query_raters(&client, &sample_content(), &ids).await;

    assert_eq!(opinions.len(), 2);
    assert_eq!(opinions[0].model, "chatgpt-4o");
    assert_eq!(opinions[0].provider, "openrouter");
    assert_eq!(opinions[0].payload.visibility.score, 61.0);
    assert_eq!(opinions[1].model, "gemini-2.5");
    assert_eq!(opinions[1].payload.visibility.score, 30.0);
}

#[tokio::test]
async fn query_raters_degrades_failing_rater_without_touching_others() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "openai/gpt-4o" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&completion_with(&full_opinion())))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "google/gemini-2.5-flash" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ids = vec!["chatgpt-4o".to_string(), "gemini-2.5".to_string()];
    let opinions = query_raters(&client, &sample_content(), &ids).await;

    assert_eq!(opinions.len(), 2, "every requested rater keeps its slot");
    assert_eq!(opinions[0].payload.visibility.score, 61.0);
    // The failing rater degrades to the all-zero opinion.
    assert_eq!(opinions[1].model, "gemini-2.5");
    assert_eq!(opinions[1].payload, visilens_core::OpinionPayload::default());
}

#[tokio::test]
async fn query_raters_degrades_on_non_json_content() {
    let server = MockServer::start().await;

    let body = json!({
        "choices": [{ "message": { "content": "I'd be happy to help, but..." } }]
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ids = vec!["chatgpt-4o".to_string()];
    let opinions = query_raters(&client, &sample_content(), &ids).await;

    assert_eq!(opinions.len(), 1);
    assert_eq!(opinions[0].payload, visilens_core::OpinionPayload::default());
}

#[tokio::test]
async fn query_raters_with_no_ids_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&completion_with(&full_opinion())))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let opinions = query_raters(&client, &sample_content(), &[]).await;
    assert!(opinions.is_empty());
}
