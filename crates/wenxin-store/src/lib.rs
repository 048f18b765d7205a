//! # wenxin-store
//!
//! Conversation session storage for the Wenxin bot adapter.
//!
//! Sessions are keyed by the hosting framework's conversation identifier and
//! hold the ordered user/assistant history sent to the model on every turn.
//! History is trimmed to a character budget after each append, and idle
//! sessions can be evicted through the `moka` cache backing the
//! [`SessionManager`].
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  SessionStore (trait)                    │
//! ├─────────────────────────────────────────┤
//! │  SessionManager (moka, time-to-idle)     │
//! │    └── Arc<Mutex<Session>> per id        │
//! └─────────────────────────────────────────┘
//! ```

pub mod error;
pub mod manager;
pub mod session;

// ── re-exports ───────────────────────────────────────────────────────

pub use error::{StoreError, StoreResult};
pub use manager::{SessionConfig, SessionManager, SessionStore};
pub use session::{Role, Session, SessionMessage};
