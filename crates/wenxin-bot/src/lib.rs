//! Chat-bot adapter for Baidu Qianfan (Wenxin).
//!
//! The hosting framework hands each inbound message to [`Bot::reply`] with a
//! [`Context`] naming the request type and conversation. [`WenxinBot`]
//! answers text with a chat completion, draws pictures for image-creation
//! requests, and wraps every outcome in a [`Reply`].

pub mod bot;
pub mod context;
pub mod helpers;
pub mod messages;
pub mod reply;

pub use bot::{Bot, WenxinBot};
pub use context::{Context, ContextType};
pub use reply::Reply;
