//! CLI argument definitions for the `wenxin` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// wenxin -- talk to Baidu Qianfan through the bot adapter.
#[derive(Parser)]
#[command(
    name = "wenxin",
    version,
    about = "Wenxin bot adapter -- chat and image generation via Baidu Qianfan"
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON when the extension is `.json`).
    #[arg(long, short, global = true, default_value = "config/wenxin.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat line by line. `#清除记忆` and `#清除所有` clear history.
    Chat {
        /// Conversation key for the session.
        #[arg(long, short, default_value = "local")]
        session: String,
    },

    /// Generate one image from a prompt and print its URL.
    Image {
        /// What to draw.
        prompt: String,
    },

    /// Print the resolved configuration with secrets masked.
    CheckConfig,
}
