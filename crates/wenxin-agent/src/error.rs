//! Agent error types.
//!
//! Every client in this crate surfaces failures through [`AgentError`].
//! Nothing here is fatal: the bot turns each variant into a user-visible
//! error reply.

/// Unified error type for the Qianfan clients.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    // -- Auth errors ---------------------------------------------------------
    /// The token provider could not produce a bearer token.
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },

    /// The API key is missing for a provider that requires one.
    #[error("missing api key for provider: {provider}")]
    MissingApiKey { provider: String },

    // -- LLM errors ----------------------------------------------------------
    /// An HTTP request to the provider failed.
    #[error("llm request failed: {reason}")]
    LlmRequestFailed { reason: String },

    /// The response could not be parsed into the expected format.
    #[error("llm response parse error: {reason}")]
    LlmParseFailed { reason: String },

    /// The provider answered with an `error` object.
    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },

    // -- Configuration errors ------------------------------------------------
    /// Configuration validation or loading failed.
    #[error("config error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the agent crate.
pub type Result<T> = std::result::Result<T, AgentError>;

impl AgentError {
    /// Whether this error came from the token provider rather than from the
    /// completion round trip.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::MissingApiKey { .. })
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::LlmRequestFailed {
            reason: err.to_string(),
        }
    }
}
