//! The Wenxin bot: request dispatch.
//!
//! Text requests go through the session store and the completion client;
//! image-creation requests go to the image client. Two reserved text
//! commands clear history without touching the model.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use wenxin_agent::{
    ApiKeyTokenProvider, CompletionClient, ImageClient, TokenProvider, WenxinConfig,
};
use wenxin_store::{SessionConfig, SessionManager, SessionStore};

use crate::context::{Context, ContextType};
use crate::messages::{self, commands};
use crate::reply::Reply;

// ---------------------------------------------------------------------------
// Bot trait
// ---------------------------------------------------------------------------

/// A chat backend the hosting framework can dispatch to.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Produce the reply for `query`, or `None` when the request type is not
    /// handled by this bot.
    async fn reply(&self, query: &str, context: &Context) -> Option<Reply>;
}

// ---------------------------------------------------------------------------
// WenxinBot
// ---------------------------------------------------------------------------

/// Bot backed by Baidu Qianfan.
#[derive(Clone)]
pub struct WenxinBot {
    sessions: Arc<dyn SessionStore>,
    completions: CompletionClient,
    images: ImageClient,
    text_to_image: bool,
}

impl WenxinBot {
    /// Build the bot and its collaborators from configuration.
    pub fn new(config: &WenxinConfig) -> wenxin_agent::Result<Self> {
        config.validate()?;

        let model = config.resolve_model();
        let sessions: Arc<dyn SessionStore> = Arc::new(SessionManager::new(SessionConfig {
            model: model.clone(),
            conversation_max_tokens: config.conversation_max_tokens,
            expires_in: config.session_ttl(),
        }));
        let tokens: Arc<dyn TokenProvider> = Arc::new(ApiKeyTokenProvider::new(&config.api_key));

        let completions = CompletionClient::new(
            config.completion_config(),
            Arc::clone(&tokens),
            Arc::clone(&sessions),
        )?;
        let images = ImageClient::new(config.image_config(), tokens)?;

        info!(
            model = %model,
            prompt_enabled = config.prompt_enabled,
            text_to_image = config.text_to_image,
            "wenxin bot ready"
        );

        Ok(Self::from_parts(
            sessions,
            completions,
            images,
            config.text_to_image,
        ))
    }

    /// Assemble the bot from already-built collaborators.
    pub fn from_parts(
        sessions: Arc<dyn SessionStore>,
        completions: CompletionClient,
        images: ImageClient,
        text_to_image: bool,
    ) -> Self {
        Self {
            sessions,
            completions,
            images,
            text_to_image,
        }
    }

    /// The session store this bot reads and writes.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    // -----------------------------------------------------------------------
    // Text
    // -----------------------------------------------------------------------

    async fn reply_text(&self, query: &str, session_id: &str) -> Reply {
        info!(session_id, query, "text query");

        match query {
            commands::CLEAR_MEMORY => {
                self.sessions.clear_session(session_id).await;
                return Reply::Info(messages::MEMORY_CLEARED.to_owned());
            }
            commands::CLEAR_ALL => {
                self.sessions.clear_all_sessions().await;
                return Reply::Info(messages::ALL_MEMORY_CLEARED.to_owned());
            }
            _ => {}
        }

        let session = match self.sessions.session_query(session_id, query).await {
            Ok(session) => session,
            Err(e) => {
                warn!(session_id, error = %e, "failed to record query");
                return Reply::Error(format!("出错了: {e}"));
            }
        };

        match self.completions.reply_text(&session).await {
            Ok(completion) => {
                debug!(
                    session_id,
                    messages = session.messages.len(),
                    reply = %completion.content,
                    completion_tokens = completion.completion_tokens(),
                    "completion ready"
                );
                match self
                    .sessions
                    .session_reply(session_id, &completion.content, completion.total_tokens())
                    .await
                {
                    Ok(Some(_)) => {}
                    Ok(None) => debug!(session_id, "session cleared mid-turn, reply not stored"),
                    Err(e) => warn!(session_id, error = %e, "failed to commit reply to session"),
                }
                Reply::Text(completion.content)
            }
            Err(e) => Reply::Error(messages::completion_failed(&e)),
        }
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    async fn reply_image(&self, query: &str) -> Reply {
        if !self.text_to_image {
            warn!("text_to_image is not enabled, ignoring image-creation request");
            return Reply::Text(String::new());
        }

        match self.images.create_image(query).await {
            Ok(url) => Reply::ImageUrl(url),
            Err(_) => Reply::Error(messages::IMAGE_FAILED.to_owned()),
        }
    }
}

#[async_trait]
impl Bot for WenxinBot {
    async fn reply(&self, query: &str, context: &Context) -> Option<Reply> {
        match context.kind {
            ContextType::Text => Some(self.reply_text(query, &context.session_id).await),
            ContextType::ImageCreate => Some(self.reply_image(query).await),
            other => {
                debug!(kind = %other, "unsupported context type, no reply");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
