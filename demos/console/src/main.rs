//! Console Conversation Demo
//!
//! Plays the part of a price bot's user: every line typed on standard input
//! arrives as a message from the configured target, and replies are printed.
//!
//! # Routes
//!
//! ```text
//! ^Choose                 -> reply "/price", keep listening
//! ^Price:\$([0-9]+)$      -> print the amount, end the conversation
//! ^Error                  -> handler fails, keep listening
//! ```
//!
//! Lines starting with `{` are parsed as JSON-encoded updates, so service
//! messages and outgoing messages can be simulated too.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package parley-console -- --target 42 --strip
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use clap::Parser;
use parley::core::CallbackAnswer;
use parley::loopback::LoopbackSource;
use parley::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(about = "Drive a Parley conversation from standard input")]
struct Args {
    /// Identity of the conversation partner.
    #[arg(long)]
    target: Option<i64>,

    /// Remove all whitespace before matching.
    #[arg(long)]
    strip: bool,

    /// Configuration file to load instead of searching for parley.toml.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Configuration profile.
    #[arg(long)]
    profile: Option<String>,

    /// Log routing decisions.
    #[arg(long, short)]
    verbose: bool,
}

// ============================================================================
// Outbound
// ============================================================================

/// Prints outgoing calls instead of sending them.
struct ConsoleOutbound;

#[async_trait]
impl Outbound for ConsoleOutbound {
    async fn send_text(&self, peer: Peer, text: &str) -> ApiResult<()> {
        println!("-> {peer}: {text}");
        Ok(())
    }

    async fn start_bot(&self, bot: Peer, start_param: &str) -> ApiResult<()> {
        println!("-> {bot}: /start {start_param}");
        Ok(())
    }

    async fn callback_answer(
        &self,
        peer: Peer,
        message_id: i32,
        data: &[u8],
    ) -> ApiResult<CallbackAnswer> {
        println!("-> {peer}: press button {data:?} on message {message_id}");
        Ok(CallbackAnswer::default())
    }

    async fn resolve_username(&self, username: &str) -> ApiResult<Peer> {
        Err(ApiError::UnresolvedUsername(username.to_string()))
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn choose(ctx: Arc<ConversationContext>) -> ApiResult<()> {
    ctx.reply("/price").await
}

async fn price(caps: Captures) -> Result<Outcome> {
    let amount: u64 = caps
        .get(1)
        .unwrap_or_default()
        .parse()
        .context("price is not a number")?;
    println!("Price: ${amount}");
    Ok(Outcome::Terminate)
}

async fn bot_error(text: Text) -> Result<()> {
    Err(anyhow!("bot reported: {}", text.as_str()))
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Pushes stdin lines into `source` until end of input.
async fn feed_stdin(source: &LoopbackSource, peer: Peer) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut id = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let pushed = if line.starts_with('{') {
            source.push_json(line).await
        } else {
            id += 1;
            source.push_message(Message::incoming(id, peer, line)).await
        };
        if let Err(e) = pushed {
            warn!(error = %e, "Dropped input line");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = ParleyRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    if let Some(target) = args.target {
        builder = builder.set("conversation.target", target);
    }
    if args.strip {
        builder = builder.set("conversation.strip", true);
    }
    if args.verbose {
        builder = builder.set("logging.level", "debug");
    }
    let runtime = builder.build()?;

    let mut conversation = runtime.conversation(Some(Arc::new(ConsoleOutbound))).await?;
    conversation
        .handle_named("choose", "^Choose", choose)?
        .handle_named("price", r"^Price:\$([0-9]+)$", price)?
        .handle_named("error", "^Error", bot_error)?;
    let peer = conversation.peer();

    let source = LoopbackSource::new();
    let run = runtime.run(conversation, &source);
    let feed = feed_stdin(&source, peer);
    tokio::pin!(run, feed);

    let result = tokio::select! {
        biased;
        result = &mut run => result,
        fed = &mut feed => {
            fed?;
            source.close();
            run.await
        }
    };

    let report = result?;
    info!(
        received = report.received,
        filtered = report.filtered,
        unmatched = report.unmatched,
        handled = report.handled,
        failed = report.failed,
        "Conversation ended"
    );
    println!(
        "Ended by '{}' after {} messages",
        report.terminated_by.as_deref().unwrap_or_default(),
        report.received
    );
    Ok(())
}
