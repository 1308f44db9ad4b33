//! # Parley
//!
//! Scripted conversations with chat bots.
//!
//! A [`Conversation`](prelude::Conversation) watches the message stream of one
//! logged-in account, keeps only what a single peer sends, and runs the first
//! handler whose regular expression matches the text. A handler either keeps
//! the conversation going or ends it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────┐     ┌────────┐     ┌───────────┐     ┌─────────┐
//! │ UpdateSource │────▶│ Fan-in  │────▶│ Filter │────▶│ Normalize │────▶│ Routes  │──▶ Handler
//! │  (adapter)   │     │ 1 queue │     │  peer  │     │  (strip)  │     │ 1st hit │
//! └──────────────┘     └─────────┘     └────────┘     └───────────┘     └─────────┘
//! ```
//!
//! - **Core**: updates, peers, deep links and the transport traits
//! - **Framework**: routing, extractors and the listen loop
//! - **Runtime**: configuration, logging and signal-aware running
//! - **Session**: the portable session-string codec
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parley::prelude::*;
//!
//! async fn choose(ctx: Arc<ConversationContext>) -> ApiResult<()> {
//!     ctx.reply("/price").await
//! }
//!
//! async fn price(caps: Captures) -> anyhow::Result<Outcome> {
//!     let amount: u32 = caps.get(1).unwrap_or_default().parse()?;
//!     info!(amount, "Got a price");
//!     Ok(Outcome::Terminate)
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = ParleyRuntime::builder().build()?;
//!     let mut conversation = runtime.conversation(Some(outbound)).await?;
//!     conversation
//!         .handle("^Choose", choose)?
//!         .handle(r"^Price:\$([0-9]+)$", price)?;
//!
//!     let report = runtime.run(conversation, &source).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output
//! - `loopback`: in-memory transport for tests and demos

pub use parley_core as core;
pub use parley_framework as framework;
pub use parley_runtime as runtime;
pub use parley_session as session;

#[cfg(feature = "loopback")]
pub use parley_adapter_loopback as loopback;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use parley::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use parley_runtime::{ParleyRuntime, RuntimeError, RuntimeResult};

    // Conversation setup and results
    pub use parley_framework::{Conversation, ListenReport, Outcome, Route};

    // Extractors - for handler parameters
    pub use parley_framework::{AllCaptures, Captures, ConversationContext, FromContext, Text};

    // Transport model and traits
    pub use parley_core::{ApiError, ApiResult, BoxedOutbound, Message, Outbound, Peer, UpdateSource};

    // Sessions
    pub use parley_session::SessionString;

    // Logging macros
    pub use parley_runtime::prelude::*;
}
