//! Parley Runtime - configuration, logging and orchestration.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`) and validation
//! - Logging configuration (`LoggingBuilder`)
//! - Conversation setup from configuration and signal-aware running
//!   (`ParleyRuntime`)
//!
//! ```rust,ignore
//! use parley_runtime::ParleyRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = ParleyRuntime::builder().build()?;
//!
//!     let mut conversation = runtime.conversation(Some(outbound.clone())).await?;
//!     conversation.handle("^Done", || async { Outcome::Terminate })?;
//!
//!     let report = runtime.run(conversation, &source).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, ParleyConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{ParleyRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
