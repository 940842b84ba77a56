//! Integration tests for `ChatClient` and `generate_posts` using wiremock HTTP mocks.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use postlens_core::TrendSummary;
use postlens_generator::{generate_posts, ChatClient, ChatSettings, Feedback, GeneratorError};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(max_retries: u32) -> ChatSettings {
    ChatSettings {
        api_key: "test-key".to_string(),
        base_url: "http://unused".to_string(),
        model: "test-model".to_string(),
        max_tokens: 1500,
        temperature: 0.7,
        max_retries,
        timeout_secs: 5,
        backoff_base_ms: 0,
    }
}

fn test_client(base_url: &str, max_retries: u32) -> ChatClient {
    ChatClient::with_base_url(settings(max_retries), base_url)
        .expect("client construction should not fail")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

fn trends() -> TrendSummary {
    TrendSummary {
        avg_engagement_by_day: BTreeMap::from([
            ("Wednesday".to_string(), 80.0),
            ("Friday".to_string(), 20.0),
        ]),
        avg_engagement_by_hour: BTreeMap::from([(8, 10.0), (11, 55.5)]),
        ..TrendSummary::default()
    }
}

fn now() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 15)
        .unwrap()
        .and_hms_opt(16, 45, 0)
        .unwrap()
}

#[tokio::test]
async fn complete_sends_prompt_and_returns_trimmed_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "max_tokens": 1500,
            "messages": [
                { "role": "system", "content": "You are a helpful assistant that strictly outputs JSON." },
                { "role": "user", "content": "write something" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  {\"a\": 1}\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let reply = client.complete("write something").await.expect("should complete");
    assert_eq!(reply, "{\"a\": 1}");
}

#[tokio::test]
async fn missing_content_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    let err = client.complete("x").await.unwrap_err();
    assert!(matches!(err, GeneratorError::Api(_)), "got: {err:?}");
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let err = client.complete("x").await.unwrap_err();
    assert!(matches!(err, GeneratorError::Http(_)), "got: {err:?}");
}

#[tokio::test]
async fn server_error_is_retried_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 2);
    assert_eq!(client.complete("x").await.unwrap(), "ok");
}

#[tokio::test]
async fn generate_posts_parses_fenced_replies() {
    let server = MockServer::start().await;

    let content = "```json\n{\"post_text\": \"AI is changing B2B. #AI\", \"explanation\": \"Focused on AI.\"}\n```";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let posts = generate_posts(&client, &trends(), &Feedback::new(), "Jane Doe", 2, now()).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].post_id, "post_trend_1_20240515_164500");
    assert_eq!(posts[1].post_id, "post_trend_2_20240515_164500");
    assert_eq!(posts[0].generated_at, "2024-05-15T16:45:00.000000");
    assert_eq!(posts[0].suggested_posting_day, "Wednesday");
    assert_eq!(posts[0].suggested_posting_hour, 11);
    assert_eq!(posts[0].post_text.as_deref(), Some("AI is changing B2B. #AI"));
    assert_eq!(posts[0].explanation.as_deref(), Some("Focused on AI."));
    assert!(posts[0].error.is_none());
}

#[tokio::test]
async fn generate_posts_records_api_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 0);
    let posts = generate_posts(
        &client,
        &TrendSummary::default(),
        &Feedback::new(),
        "Jane Doe",
        1,
        now(),
    )
    .await;

    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert!(post.post_text.is_none());
    assert_eq!(post.suggested_posting_day, "Tuesday");
    assert_eq!(post.suggested_posting_hour, 15);
    assert!(post.error.as_deref().unwrap().starts_with("API Error: "));
    assert!(post
        .explanation
        .as_deref()
        .unwrap()
        .starts_with("Error during generation: "));
}
