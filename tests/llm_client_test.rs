//! Chat completion client and query generator tests
//!
//! HTTP behaviour is exercised against a wiremock server.

use briefcraft::llm::{
    ChatClient, ChatCompletionOptions, ChatCompletionResponse, ChatMessage, LlmError,
};
use briefcraft::query::{QueryContext, QueryGenerator};
use briefcraft::status::{Notification, Status, StatusSink};
use chrono::{Datelike, Local};
use futures::StreamExt;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

fn sse_body(parts: &[&str]) -> String {
    let mut body = String::new();
    for part in parts {
        let chunk = json!({"choices": [{"delta": {"content": part}, "finish_reason": null}]});
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    let stop = json!({"choices": [{"delta": {}, "finish_reason": "stop"}]});
    body.push_str(&format!("data: {}\n\n", stop));
    body.push_str("data: [DONE]\n\n");
    body
}

fn client(server: &MockServer) -> ChatClient {
    ChatClient::with_config("sk-test", Some(server.uri()), None)
}

async fn complete(client: &ChatClient, model: &str) -> Result<ChatCompletionResponse, LlmError> {
    client
        .chat_completion(model, vec![ChatMessage::user("x")], ChatCompletionOptions::default())
        .await
}

#[derive(Default)]
struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl StatusSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

// =============================================================================
// Client Tests
// =============================================================================

#[test]
fn test_client_defaults() {
    let client = ChatClient::new("sk-test");
    assert_eq!(client.api_key(), "sk-test");
    assert_eq!(client.base_url(), "https://api.openai.com/v1");
}

#[test]
fn test_build_request_body() {
    let client = ChatClient::new("key");
    let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
    let options = ChatCompletionOptions {
        max_tokens: Some(4096),
        temperature: Some(0.0),
    };

    let body = client.build_request_body("gpt-4o-mini", &messages, &options, true);
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "hi");
    assert_eq!(body["stream"], true);
    assert_eq!(body["max_tokens"], 4096);
}

#[tokio::test]
async fn test_chat_completion_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"content": "Compiled report"}, "finish_reason": "stop"}]
        })))
        .mount(&server)
        .await;

    let response = client(&server)
        .chat_completion(
            "gpt-4o-mini",
            vec![ChatMessage::user("compile")],
            ChatCompletionOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.content, "Compiled report");
    assert_eq!(response.model, "gpt-4o-mini");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn test_error_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "unauthorized"})))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "limited"})))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "broken"})))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": {"message": "model overloaded"}})),
        )
        .mount(&server)
        .await;

    let client = client(&server);

    assert!(matches!(
        complete(&client, "unauthorized").await,
        Err(LlmError::Unauthorized)
    ));
    assert!(matches!(
        complete(&client, "limited").await,
        Err(LlmError::RateLimit { retry_after_secs: 7 })
    ));
    match complete(&client, "broken").await {
        Err(LlmError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "model overloaded");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_stream_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["Hello", ", ", "world"])),
        )
        .mount(&server)
        .await;

    let stream = client(&server)
        .stream_chat_completion(
            "gpt-4o-mini",
            vec![ChatMessage::user("hi")],
            ChatCompletionOptions::default(),
        )
        .await
        .unwrap();
    let chunks: Vec<_> = stream.collect().await;

    assert_eq!(chunks.len(), 4);
    let text: String = chunks
        .iter()
        .filter_map(|c| c.as_ref().ok().and_then(|c| c.content.clone()))
        .collect();
    assert_eq!(text, "Hello, world");
    assert!(chunks[3].as_ref().unwrap().is_stop());
}

// =============================================================================
// Query Generator Tests
// =============================================================================

#[tokio::test]
async fn test_generator_streams_queries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true, "temperature": 0.0, "max_tokens": 4096})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&[
                    "Acme Corp ",
                    "recent news 2024\nAcme Corp product",
                    " launches\n",
                    "Acme Corp partnerships",
                ])),
        )
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let generator = QueryGenerator::new(Arc::new(client(&server)), "gpt-4o-mini")
        .with_sink(sink.clone());
    let ctx = QueryContext::new(Some("Acme Corp"), Some("Robotics"), None);

    let queries = generator
        .generate(&ctx, "Find recent news.", "news_analyst")
        .await
        .unwrap();

    assert_eq!(
        queries,
        vec![
            "Acme Corp recent news 2024",
            "Acme Corp product launches",
            "Acme Corp partnerships",
        ]
    );
    let generated = sink
        .notifications
        .lock()
        .unwrap()
        .iter()
        .filter(|n| n.status() == Some(Status::QueryGenerated))
        .count();
    assert_eq!(generated, 3);
}

#[tokio::test]
async fn test_generator_falls_back_on_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let sink = Arc::new(RecordingSink::default());
    let generator = QueryGenerator::new(Arc::new(client(&server)), "gpt-4o-mini")
        .with_sink(sink.clone());
    let ctx = QueryContext::new(Some("Acme Corp"), None, None);

    let queries = generator
        .generate_or_fallback(&ctx, "Find news.", "news_analyst")
        .await;

    let year = Local::now().year();
    assert_eq!(queries.len(), 4);
    assert_eq!(queries[0], format!("Acme Corp overview {}", year));
    assert_eq!(queries[3], format!("Acme Corp industry analysis {}", year));

    let notifications = sink.notifications.lock().unwrap();
    let error = notifications
        .iter()
        .find_map(|n| match n {
            Notification::StatusUpdate(u) if u.status == Status::Error => Some(u.clone()),
            _ => None,
        })
        .expect("error status");
    assert!(error.message.starts_with("Failed to generate research queries"));
    assert!(error.error.unwrap().starts_with("Query generation failed"));
}

#[tokio::test]
async fn test_generator_falls_back_on_empty_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["\n", "  \n"])),
        )
        .mount(&server)
        .await;

    let generator =
        QueryGenerator::new(Arc::new(client(&server)), "gpt-4o-mini").with_max_queries(2);
    let ctx = QueryContext::new(Some("Acme Corp"), None, None);

    let queries = generator
        .generate_or_fallback(&ctx, "Find news.", "company_analyst")
        .await;

    let year = Local::now().year();
    assert_eq!(
        queries,
        vec![
            format!("Acme Corp overview {}", year),
            format!("Acme Corp recent news {}", year),
        ]
    );
}

#[tokio::test]
async fn test_fallback_keeps_at_least_one_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let generator =
        QueryGenerator::new(Arc::new(client(&server)), "gpt-4o-mini").with_max_queries(0);
    let ctx = QueryContext::new(Some("Acme Corp"), None, None);

    let queries = generator
        .generate_or_fallback(&ctx, "Find news.", "company_analyst")
        .await;

    assert_eq!(queries, vec![format!("Acme Corp overview {}", Local::now().year())]);
}
