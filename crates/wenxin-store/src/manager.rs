//! Session store trait and its in-memory implementation.
//!
//! [`SessionManager`] keeps one `Arc<Mutex<Session>>` per conversation in a
//! `moka` cache. Mutation of a single session is serialized by its mutex;
//! different sessions never contend. When an idle timeout is configured the
//! cache evicts sessions that have not been touched for that long.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::error::{StoreError, StoreResult};
use crate::session::Session;

/// Default history budget, in estimated tokens.
pub const DEFAULT_CONVERSATION_MAX_TOKENS: usize = 1000;

// ═══════════════════════════════════════════════════════════════════════
//  Trait
// ═══════════════════════════════════════════════════════════════════════

/// Conversation storage used by the bot dispatcher and completion client.
///
/// Queries create the session on demand; replies only land in a session
/// that still exists. Returned sessions are snapshots; later mutation does
/// not affect them.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Append a user query to the session and trim the history.
    async fn session_query(&self, session_id: &str, query: &str) -> StoreResult<Session>;

    /// Append an assistant reply, record its usage, and trim the history.
    ///
    /// Returns `Ok(None)` without storing anything when the session was
    /// cleared or expired while the reply was in flight.
    async fn session_reply(
        &self,
        session_id: &str,
        reply: &str,
        total_tokens: u64,
    ) -> StoreResult<Option<Session>>;

    /// Snapshot of a session, if it exists.
    async fn get(&self, session_id: &str) -> Option<Session>;

    /// Delete one session. Missing sessions are ignored.
    async fn clear_session(&self, session_id: &str);

    /// Delete every session.
    async fn clear_all_sessions(&self);
}

// ═══════════════════════════════════════════════════════════════════════
//  SessionManager
// ═══════════════════════════════════════════════════════════════════════

/// Settings for a [`SessionManager`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model assigned to newly created sessions.
    pub model: String,
    /// History budget enforced after every append.
    pub conversation_max_tokens: usize,
    /// Evict sessions idle for longer than this.
    pub expires_in: Option<Duration>,
}

impl SessionConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            conversation_max_tokens: DEFAULT_CONVERSATION_MAX_TOKENS,
            expires_in: None,
        }
    }
}

/// In-memory [`SessionStore`] backed by `moka::future::Cache`.
#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SessionConfig>,
    sessions: Cache<String, Arc<Mutex<Session>>>,
}

impl SessionManager {
    /// Create a manager with the given settings.
    pub fn new(config: SessionConfig) -> Self {
        let mut builder = Cache::builder();
        if let Some(ttl) = config.expires_in {
            builder = builder.time_to_idle(ttl);
        }

        info!(
            model = %config.model,
            max_tokens = config.conversation_max_tokens,
            expires_in_secs = config.expires_in.map(|d| d.as_secs()),
            "session manager ready"
        );

        Self {
            config: Arc::new(config),
            sessions: builder.build(),
        }
    }

    /// Fetch the session slot, creating an empty session if absent.
    async fn slot(&self, session_id: &str) -> StoreResult<Arc<Mutex<Session>>> {
        check_id(session_id)?;

        let model = self.config.model.clone();
        let id = session_id.to_owned();
        let slot = self
            .sessions
            .get_with(session_id.to_owned(), async move {
                debug!(session_id = %id, model = %model, "session created");
                Arc::new(Mutex::new(Session::new(id, model)))
            })
            .await;
        Ok(slot)
    }
}

fn check_id(session_id: &str) -> StoreResult<()> {
    if session_id.is_empty() {
        return Err(StoreError::InvalidArgument(
            "session id must not be empty".into(),
        ));
    }
    Ok(())
}

#[async_trait]
impl SessionStore for SessionManager {
    #[instrument(skip(self, query))]
    async fn session_query(&self, session_id: &str, query: &str) -> StoreResult<Session> {
        let slot = self.slot(session_id).await?;
        let mut session = slot.lock().await;
        session.add_query(query);
        let prompt_tokens = session.discard_exceeding(self.config.conversation_max_tokens);
        debug!(prompt_tokens, messages = session.messages.len(), "query appended");
        Ok(session.clone())
    }

    #[instrument(skip(self, reply))]
    async fn session_reply(
        &self,
        session_id: &str,
        reply: &str,
        total_tokens: u64,
    ) -> StoreResult<Option<Session>> {
        check_id(session_id)?;

        let Some(slot) = self.sessions.get(session_id).await else {
            debug!("session no longer exists, reply dropped");
            return Ok(None);
        };
        let mut session = slot.lock().await;
        session.add_reply(reply);
        session.record_usage(total_tokens);
        let kept_tokens = session.discard_exceeding(self.config.conversation_max_tokens);
        debug!(
            total_tokens,
            kept_tokens,
            cumulative_tokens = session.total_tokens,
            "reply committed"
        );
        Ok(Some(session.clone()))
    }

    async fn get(&self, session_id: &str) -> Option<Session> {
        let slot = self.sessions.get(session_id).await?;
        let session = slot.lock().await;
        Some(session.clone())
    }

    async fn clear_session(&self, session_id: &str) {
        self.sessions.invalidate(session_id).await;
        debug!(session_id, "session cleared");
    }

    async fn clear_all_sessions(&self) {
        self.sessions.invalidate_all();
        debug!("all sessions cleared");
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
