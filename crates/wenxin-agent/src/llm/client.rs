//! Qianfan chat-completion client.
//!
//! Sends a session's history to `POST {base_url}/v2/chat/completions` and
//! parses the reply text and token usage. Any failure after the bearer token
//! is obtained clears the session, so a history the provider rejected does
//! not poison the next turn.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use wenxin_store::{Session, SessionStore};

use crate::auth::TokenProvider;
use crate::config::DEFAULT_BASE_URL;
use crate::error::{AgentError, Result};
use crate::llm::types::{Completion, Usage};

/// Path of the chat-completions endpoint, relative to the base URL.
const CHAT_COMPLETIONS_PATH: &str = "/v2/chat/completions";

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Configuration for the [`CompletionClient`].
#[derive(Debug, Clone)]
pub struct CompletionClientConfig {
    /// Base URL for the API (e.g. `https://qianfan.baidubce.com`).
    pub base_url: String,
    /// Persona sent as `system`; `None` disables prompt injection.
    pub system_prompt: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for CompletionClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            system_prompt: None,
            timeout: Duration::from_secs(120),
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat-completion client bound to one token provider and session store.
#[derive(Clone)]
pub struct CompletionClient {
    config: Arc<CompletionClientConfig>,
    tokens: Arc<dyn TokenProvider>,
    sessions: Arc<dyn SessionStore>,
    http: reqwest::Client,
}

impl CompletionClient {
    /// Create a new client with the given configuration.
    pub fn new(
        config: CompletionClientConfig,
        tokens: Arc<dyn TokenProvider>,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::LlmRequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            tokens,
            sessions,
            http,
        })
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Run one completion over `session`'s history.
    ///
    /// A token failure returns [`AgentError::Authentication`] without any
    /// network call and leaves the session alone. Every other failure clears
    /// the session before the error is returned. Exactly one attempt is made.
    pub async fn reply_text(&self, session: &Session) -> Result<Completion> {
        info!(session_id = %session.id, model = %session.model, "requesting completion");

        let token = self.tokens.access_token().await.map_err(|e| {
            warn!(session_id = %session.id, error = %e, "failed to obtain access token");
            match e {
                AgentError::Authentication { .. } | AgentError::MissingApiKey { .. } => e,
                other => AgentError::Authentication {
                    reason: other.to_string(),
                },
            }
        })?;

        match self.send(&token, session).await {
            Ok(completion) => {
                info!(
                    session_id = %session.id,
                    total_tokens = completion.total_tokens(),
                    completion_tokens = completion.completion_tokens(),
                    "completion received"
                );
                Ok(completion)
            }
            Err(e) => {
                warn!(
                    session_id = %session.id,
                    error = %e,
                    "completion failed, resetting session"
                );
                self.sessions.clear_session(&session.id).await;
                Err(e)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Request building
    // -----------------------------------------------------------------------

    /// Build the JSON body for the chat-completions endpoint.
    pub fn build_request_body(&self, session: &Session) -> Value {
        let mut body = json!({
            "messages": session.messages,
            "model": session.model,
        });

        if let Some(system) = &self.config.system_prompt {
            body["system"] = json!(system);
        }

        body
    }

    /// Send the request and parse the response.
    async fn send(&self, token: &str, session: &Session) -> Result<Completion> {
        let url = format!("{}{CHAT_COMPLETIONS_PATH}", self.config.base_url);
        let body = self.build_request_body(session);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                AgentError::LlmRequestFailed {
                    reason: format!("invalid authorization header: {e}"),
                }
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!(
            url = %url,
            model = %session.model,
            messages = session.messages.len(),
            "sending completion request"
        );

        let resp = self
            .http
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| AgentError::LlmRequestFailed {
                reason: format!("failed to read response body: {e}"),
            })?;

        debug!(status = %status, body = %text, "completion response");

        if !status.is_success() {
            if let Some(err) = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| provider_error(&v))
            {
                return Err(err);
            }
            return Err(AgentError::LlmRequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| AgentError::LlmParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;

        parse_completion_response(&v)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parse a chat-completions response body into a [`Completion`].
pub fn parse_completion_response(v: &Value) -> Result<Completion> {
    if let Some(err) = provider_error(v) {
        return Err(err);
    }

    let content = v["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| AgentError::LlmParseFailed {
            reason: "missing `choices[0].message.content` in response".into(),
        })?;

    let usage = &v["usage"];
    let total_tokens = usage["total_tokens"]
        .as_u64()
        .ok_or_else(|| AgentError::LlmParseFailed {
            reason: "missing `usage.total_tokens` in response".into(),
        })?;
    let completion_tokens = usage["completion_tokens"]
        .as_u64()
        .ok_or_else(|| AgentError::LlmParseFailed {
            reason: "missing `usage.completion_tokens` in response".into(),
        })?;

    Ok(Completion {
        content: content.to_owned(),
        usage: Usage {
            total_tokens,
            completion_tokens,
        },
    })
}

/// Extract the provider's `error` object, if the body carries one.
pub(crate) fn provider_error(v: &Value) -> Option<AgentError> {
    let err = v.get("error")?;
    if !err.is_object() {
        return None;
    }

    let code = match &err["code"] {
        Value::String(s) => s.clone(),
        Value::Null => "unknown".to_owned(),
        other => other.to_string(),
    };
    let message = err["message"].as_str().unwrap_or_default().to_owned();

    Some(AgentError::Provider { code, message })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
