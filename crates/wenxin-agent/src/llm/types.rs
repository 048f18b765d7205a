//! Result types returned by the Qianfan clients.

use serde::{Deserialize, Serialize};

/// Token usage reported by the provider for one completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt plus completion tokens.
    pub total_tokens: u64,
    /// Tokens generated by the model.
    pub completion_tokens: u64,
}

/// A successful chat completion.
///
/// Failures are reported as [`AgentError`](crate::AgentError) rather than a
/// zero-usage value, so a legitimate `total_tokens == 0` is still a success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// The assistant reply text.
    pub content: String,
    /// Usage reported alongside the reply.
    pub usage: Usage,
}

impl Completion {
    pub fn total_tokens(&self) -> u64 {
        self.usage.total_tokens
    }

    pub fn completion_tokens(&self) -> u64 {
        self.usage.completion_tokens
    }
}
