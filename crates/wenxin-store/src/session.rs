//! Conversation session model.
//!
//! A [`Session`] holds the ordered user/assistant history for one
//! conversation together with the model it talks to. Qianfan rejects a
//! `system` role inside `messages`, so a session only ever contains user
//! and assistant turns; the persona travels in the request's `system` field.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// The author of a message in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Input from the end user.
    User,
    /// Output from the model.
    Assistant,
}

/// A single role-tagged message, serialized exactly as the provider expects
/// it inside the `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: Role,
    pub content: String,
}

impl SessionMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Conversation key supplied by the hosting framework.
    pub id: String,
    /// Model endpoint name used for this session (e.g. `completions`).
    pub model: String,
    /// Ordered history, oldest first.
    pub messages: Vec<SessionMessage>,
    /// Cumulative `total_tokens` reported by every committed reply.
    pub total_tokens: u64,
    /// Unix timestamp when the session was created.
    pub created_at: i64,
    /// Unix timestamp of the last append.
    pub updated_at: i64,
}

// ═══════════════════════════════════════════════════════════════════════
//  Session
// ═══════════════════════════════════════════════════════════════════════

impl Session {
    /// Create an empty session bound to `model`.
    pub fn new(id: impl Into<String>, model: impl Into<String>) -> Self {
        let now = Utc::now().timestamp();
        Self {
            id: id.into(),
            model: model.into(),
            messages: Vec::new(),
            total_tokens: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a user turn.
    pub fn add_query(&mut self, query: impl Into<String>) {
        self.messages.push(SessionMessage::user(query));
        self.touch();
    }

    /// Append an assistant turn.
    pub fn add_reply(&mut self, reply: impl Into<String>) {
        self.messages.push(SessionMessage::assistant(reply));
        self.touch();
    }

    /// Add the usage reported for a committed reply to the running total.
    pub fn record_usage(&mut self, total_tokens: u64) {
        self.total_tokens = self.total_tokens.saturating_add(total_tokens);
    }

    /// Whether the session has no history.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Estimated prompt size of the history.
    ///
    /// Counts characters, not bytes, so CJK text is weighted the same way
    /// the provider bills it.
    pub fn calc_tokens(&self) -> usize {
        self.messages
            .iter()
            .map(|m| m.content.chars().count())
            .sum()
    }

    /// Drop the oldest message pairs until the history fits in
    /// `max_tokens`, returning the remaining estimate.
    ///
    /// The newest message always survives, so a single oversized query is
    /// still sent.
    pub fn discard_exceeding(&mut self, max_tokens: usize) -> usize {
        let mut cur_tokens = self.calc_tokens();
        while cur_tokens > max_tokens {
            if self.messages.len() <= 1 {
                debug!(
                    session_id = %self.id,
                    max_tokens,
                    cur_tokens,
                    messages = self.messages.len(),
                    "history still over budget, nothing left to discard"
                );
                break;
            }
            // The newest message is the turn being answered; never drop it.
            let n = 2usize.min(self.messages.len() - 1);
            self.messages.drain(..n);
            cur_tokens = self.calc_tokens();
        }
        cur_tokens
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now().timestamp();
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
