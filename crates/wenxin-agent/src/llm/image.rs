//! Qianfan text-to-image client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, error, info};

use crate::auth::TokenProvider;
use crate::config::DEFAULT_BASE_URL;
use crate::error::{AgentError, Result};
use crate::llm::client::provider_error;

/// Path of the image-generation endpoint, relative to the base URL.
const IMAGE_GENERATIONS_PATH: &str = "/v2/images/generations";

/// Image model requested on every call.
pub const IMAGE_MODEL: &str = "irag-1.0";

/// Configuration for the [`ImageClient`].
#[derive(Debug, Clone)]
pub struct ImageClientConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Maximum silence between reads once connected.
    pub read_timeout: Duration,
}

impl Default for ImageClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(90),
        }
    }
}

/// Text-to-image client. One attempt per call.
#[derive(Clone)]
pub struct ImageClient {
    config: Arc<ImageClientConfig>,
    tokens: Arc<dyn TokenProvider>,
    http: reqwest::Client,
}

impl ImageClient {
    pub fn new(config: ImageClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .timeout(config.connect_timeout + config.read_timeout)
            .build()
            .map_err(|e| AgentError::LlmRequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            config: Arc::new(config),
            tokens,
            http,
        })
    }

    /// Generate an image for `prompt` and return its URL.
    ///
    /// Failures are logged here; callers only need to pick the user-facing
    /// message.
    pub async fn create_image(&self, prompt: &str) -> Result<String> {
        info!(prompt = %prompt, model = IMAGE_MODEL, "requesting image");

        match self.send(prompt).await {
            Ok(url) => {
                info!(image_url = %url, "image generated");
                Ok(url)
            }
            Err(e) => {
                error!(error = %e, "image generation failed");
                Err(e)
            }
        }
    }

    /// Build the JSON body for the image-generation endpoint.
    pub fn build_request_body(&self, prompt: &str) -> Value {
        json!({
            "prompt": prompt,
            "model": IMAGE_MODEL,
        })
    }

    async fn send(&self, prompt: &str) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}{IMAGE_GENERATIONS_PATH}", self.config.base_url);

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

        debug!(url = %url, "sending image request");

        let resp = self
            .http
            .post(&url)
            .headers(headers)
            .json(&self.build_request_body(prompt))
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(AgentError::LlmRequestFailed {
                reason: format!("API returned {status}: {text}"),
            });
        }

        let v: Value = serde_json::from_str(&text).map_err(|e| AgentError::LlmParseFailed {
            reason: format!("invalid JSON response: {e}"),
        })?;

        parse_image_response(&v)
    }
}

/// Extract `data[0].url` from an image-generation response.
pub fn parse_image_response(v: &Value) -> Result<String> {
    if let Some(err) = provider_error(v) {
        return Err(err);
    }

    v["data"][0]["url"]
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| AgentError::LlmParseFailed {
            reason: "missing `data[0].url` in response".into(),
        })
}
