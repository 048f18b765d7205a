//! User-facing strings and reserved commands.
//!
//! The bot talks to Chinese-speaking users, so every reply text it makes up
//! itself lives here rather than inline in the dispatcher.

use wenxin_agent::AgentError;

/// Text commands that bypass the model.
pub mod commands {
    /// Clear the current conversation's history.
    pub const CLEAR_MEMORY: &str = "#清除记忆";
    /// Clear every conversation's history.
    pub const CLEAR_ALL: &str = "#清除所有";
}

pub const MEMORY_CLEARED: &str = "记忆已清除";
pub const ALL_MEMORY_CLEARED: &str = "所有人记忆已清除";
pub const IMAGE_FAILED: &str = "画图出现问题，请休息一下再问我吧";

/// Render a completion failure for the end user.
///
/// Token failures carry no detail; the operator sees the cause in the logs.
pub fn completion_failed(err: &AgentError) -> String {
    if err.is_auth() {
        String::new()
    } else {
        format!("出错了: {err}")
    }
}
