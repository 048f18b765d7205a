//! Bearer token sources.
//!
//! The completion and image clients never read credentials directly; they
//! ask a [`TokenProvider`] for the bearer token on every call so rotating
//! or exchanged tokens can be plugged in without touching the clients.

use async_trait::async_trait;

use crate::error::{AgentError, Result};

/// Supplies the bearer token for the `Authorization` header.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a usable access token, or [`AgentError::Authentication`] when
    /// none can be obtained.
    async fn access_token(&self) -> Result<String>;
}

/// Uses a Qianfan v2 API key as the bearer token.
#[derive(Clone)]
pub struct ApiKeyTokenProvider {
    api_key: String,
}

impl ApiKeyTokenProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for ApiKeyTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyTokenProvider")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenProvider for ApiKeyTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(AgentError::Authentication {
                reason: "api key is empty".into(),
            });
        }
        Ok(self.api_key.clone())
    }
}
