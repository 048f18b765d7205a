//! Integration tests for the wenxin-agent crate.
//!
//! The completion and image clients run against a `wiremock` server that
//! plays the Qianfan v2 API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wenxin_agent::{
    AgentError, ApiKeyTokenProvider, CompletionClient, CompletionClientConfig, ImageClient,
    ImageClientConfig, TokenProvider,
};
use wenxin_store::{SessionConfig, SessionManager, SessionStore};

// ═══════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════

/// Token provider that always fails, like an expired credential exchange.
struct FailingTokenProvider;

#[async_trait]
impl TokenProvider for FailingTokenProvider {
    async fn access_token(&self) -> wenxin_agent::Result<String> {
        Err(AgentError::Authentication {
            reason: "token endpoint unreachable".into(),
        })
    }
}

fn sessions() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(SessionConfig::new("completions")))
}

fn completion_client(
    server: &MockServer,
    system_prompt: Option<&str>,
    tokens: Arc<dyn TokenProvider>,
    sessions: Arc<SessionManager>,
) -> CompletionClient {
    let config = CompletionClientConfig {
        base_url: server.uri(),
        system_prompt: system_prompt.map(str::to_owned),
        timeout: Duration::from_secs(5),
    };
    CompletionClient::new(config, tokens, sessions).unwrap()
}

fn image_client(server: &MockServer, read_timeout: Duration) -> ImageClient {
    let config = ImageClientConfig {
        base_url: server.uri(),
        connect_timeout: Duration::from_secs(1),
        read_timeout,
    };
    ImageClient::new(config, Arc::new(ApiKeyTokenProvider::new("test-key"))).unwrap()
}

fn chat_response(content: &str, total: u64, completion: u64) -> serde_json::Value {
    json!({
        "id": "as-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "completions",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "normal"
        }],
        "usage": {
            "prompt_tokens": total - completion,
            "completion_tokens": completion,
            "total_tokens": total
        }
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  Completion client
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn completion_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "Hello"}],
            "model": "completions"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Hi!", 10, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let store = sessions();
    let client = completion_client(
        &server,
        None,
        Arc::new(ApiKeyTokenProvider::new("test-key")),
        store.clone(),
    );

    let session = store.session_query("chat-1", "Hello").await.unwrap();
    let completion = client.reply_text(&session).await.unwrap();

    assert_eq!(completion.content, "Hi!");
    assert_eq!(completion.total_tokens(), 10);
    assert_eq!(completion.completion_tokens(), 3);
    // The client does not commit the turn; that is the caller's job.
    assert_eq!(store.get("chat-1").await.unwrap().messages.len(), 1);
}

#[tokio::test]
async fn completion_sends_system_prompt_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/chat/completions"))
        .and(body_json(json!({
            "messages": [{"role": "user", "content": "Hello"}],
            "model": "completions",
            "system": "You are a helpful cat."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Meow", 5, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let store = sessions();
    let client = completion_client(
        &server,
        Some("You are a helpful cat."),
        Arc::new(ApiKeyTokenProvider::new("test-key")),
        store.clone(),
    );

    let session = store.session_query("chat-1", "Hello").await.unwrap();
    let completion = client.reply_text(&session).await.unwrap();
    assert_eq!(completion.content, "Meow");
}

#[tokio::test]
async fn token_failure_skips_network_and_keeps_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("Hi!", 10, 3)))
        .expect(0)
        .mount(&server)
        .await;

    let store = sessions();
    let client = completion_client(&server, None, Arc::new(FailingTokenProvider), store.clone());

    let session = store.session_query("chat-1", "Hello").await.unwrap();
    let err = client.reply_text(&session).await.unwrap_err();

    assert!(err.is_auth());
    assert_eq!(store.get("chat-1").await.unwrap().messages.len(), 1);
}

#[tokio::test]
async fn http_error_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let store = sessions();
    let client = completion_client(
        &server,
        None,
        Arc::new(ApiKeyTokenProvider::new("test-key")),
        store.clone(),
    );

    let session = store.session_query("chat-1", "Hello").await.unwrap();
    let err = client.reply_text(&session).await.unwrap_err();

    match err {
        AgentError::LlmRequestFailed { reason } => {
            assert!(reason.contains("500"));
            assert!(reason.contains("upstream exploded"));
        }
        other => panic!("expected LlmRequestFailed, got {other:?}"),
    }
    assert!(store.get("chat-1").await.is_none());
}

#[tokio::test]
async fn malformed_body_clears_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let store = sessions();
    let client = completion_client(
        &server,
        None,
        Arc::new(ApiKeyTokenProvider::new("test-key")),
        store.clone(),
    );

    let session = store.session_query("chat-1", "Hello").await.unwrap();
    let err = client.reply_text(&session).await.unwrap_err();

    assert!(matches!(err, AgentError::LlmParseFailed { .. }));
    assert!(store.get("chat-1").await.is_none());
}

#[tokio::test]
async fn provider_error_object_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "id": "as-err",
            "error": {
                "code": "invalid_iam_token",
                "message": "IAM Certification failed",
                "type": "invalid_request_error"
            }
        })))
        .mount(&server)
        .await;

    let store = sessions();
    let client = completion_client(
        &server,
        None,
        Arc::new(ApiKeyTokenProvider::new("test-key")),
        store.clone(),
    );

    let session = store.session_query("chat-1", "Hello").await.unwrap();
    let err = client.reply_text(&session).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "provider error invalid_iam_token: IAM Certification failed"
    );
    assert!(store.get("chat-1").await.is_none());
}

#[tokio::test]
async fn failure_makes_exactly_one_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let store = sessions();
    let client = completion_client(
        &server,
        None,
        Arc::new(ApiKeyTokenProvider::new("test-key")),
        store.clone(),
    );

    let session = store.session_query("chat-1", "Hello").await.unwrap();
    assert!(client.reply_text(&session).await.is_err());
}

// ═══════════════════════════════════════════════════════════════════════
//  Image client
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn image_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/images/generations"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_json(json!({"prompt": "a cat", "model": "irag-1.0"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "img-1",
            "created": 1_700_000_000,
            "data": [{"url": "https://qianfan.example/cat.png"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = image_client(&server, Duration::from_secs(5));
    let url = client.create_image("a cat").await.unwrap();
    assert_eq!(url, "https://qianfan.example/cat.png");
}

#[tokio::test]
async fn image_http_error_is_returned() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/images/generations"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = image_client(&server, Duration::from_secs(5));
    assert!(client.create_image("a cat").await.is_err());
}

#[tokio::test]
async fn image_timeout_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/images/generations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"url": "https://late.example"}]}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = image_client(&server, Duration::from_millis(200));
    let err = client.create_image("a cat").await.unwrap_err();
    assert!(matches!(err, AgentError::LlmRequestFailed { .. }));
}
