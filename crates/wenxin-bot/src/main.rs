//! CLI entry point for the Wenxin bot adapter.
//!
//! The `wenxin` binary drives [`WenxinBot`] from a terminal: a line-based
//! chat REPL, one-shot image generation, and a configuration check.

mod cli;

use std::io::{self, BufRead, Write as _};
use std::path::Path;

use anyhow::{Context as _, Result};
use clap::Parser;
use tracing::info;

use wenxin_agent::WenxinConfig;
use wenxin_bot::helpers::init_tracing;
use wenxin_bot::{Bot, Context, Reply, WenxinBot};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing("info");

    match cli.command {
        Commands::Chat { session } => cmd_chat(&cli.config, &session).await,
        Commands::Image { prompt } => cmd_image(&cli.config, &prompt).await,
        Commands::CheckConfig => cmd_check_config(&cli.config),
    }
}

fn load_config(path: &Path) -> Result<WenxinConfig> {
    WenxinConfig::load(Some(path))
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

// ---------------------------------------------------------------------------
// Subcommand: chat
// ---------------------------------------------------------------------------

async fn cmd_chat(config_path: &Path, session_id: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let bot = WenxinBot::new(&config).context("failed to create bot")?;
    let context = Context::text(session_id);

    info!(session_id, model = %config.resolve_model(), "chat started");

    println!();
    println!("  wenxin v{}", env!("CARGO_PKG_VERSION"));
    println!("  Type a message, or 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().context("failed to flush stdout")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            info!("user requested exit");
            break;
        }

        if let Some(reply) = bot.reply(trimmed, &context).await {
            print_reply(&reply);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: image
// ---------------------------------------------------------------------------

async fn cmd_image(config_path: &Path, prompt: &str) -> Result<()> {
    let mut config = load_config(config_path)?;
    // Asking for an image explicitly implies the feature is wanted.
    config.text_to_image = true;
    let bot = WenxinBot::new(&config).context("failed to create bot")?;

    match bot.reply(prompt, &Context::image_create("cli")).await {
        Some(reply @ Reply::Error(_)) => {
            print_reply(&reply);
            anyhow::bail!("image generation failed");
        }
        Some(reply) => print_reply(&reply),
        None => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: check-config
// ---------------------------------------------------------------------------

fn cmd_check_config(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let shown = serde_json::to_string_pretty(&config.redacted())
        .context("failed to serialize configuration")?;

    println!("{shown}");
    println!("resolved model: {}", config.resolve_model());

    match config.validate() {
        Ok(()) => println!("configuration OK"),
        Err(e) => anyhow::bail!("configuration invalid: {e}"),
    }
    Ok(())
}

fn print_reply(reply: &Reply) {
    println!("{reply}");
    println!();
}
