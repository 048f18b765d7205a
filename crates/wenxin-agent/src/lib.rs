//! Baidu Qianfan (Wenxin) clients for the bot adapter.
//!
//! This crate turns a conversation session into a Qianfan chat-completion
//! request, and a prompt into a text-to-image request, and parses the
//! provider's JSON back into typed results.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────┐
//! │ WenxinConfig │──>│ CompletionClient │──>│  Qianfan v2 │
//! └──────────────┘   │ ImageClient      │   │  HTTP API   │
//!                    └───────┬──────────┘   └─────────────┘
//!                            │
//!              ┌─────────────┴────────────┐
//!              │ TokenProvider            │
//!              │ SessionStore (reset)     │
//!              └──────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] -- File and environment configuration.
//! - [`auth`] -- Bearer token providers.
//! - [`llm`] -- Completion and image clients.
//! - [`error`] -- Agent error types.

pub mod auth;
pub mod config;
pub mod error;
pub mod llm;

// Re-export the most commonly used types at the crate root.
pub use auth::{ApiKeyTokenProvider, TokenProvider};
pub use config::WenxinConfig;
pub use error::{AgentError, Result};
pub use llm::{
    Completion, CompletionClient, CompletionClientConfig, ImageClient, ImageClientConfig, Usage,
};
