//! Error types for the loopback adapter.

use thiserror::Error;

/// Errors raised while feeding updates into a [`LoopbackSource`](crate::LoopbackSource).
#[derive(Debug, Error)]
pub enum LoopbackError {
    /// The line is not a valid JSON update.
    #[error("invalid update: {0}")]
    Decode(#[from] serde_json::Error),

    /// No listener is registered for the update's kind.
    #[error("no listener registered for {0} updates")]
    NoListener(parley_core::UpdateKind),
}

/// Result type for loopback operations.
pub type LoopbackResult<T> = Result<T, LoopbackError>;
