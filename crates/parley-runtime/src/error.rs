//! Runtime error types.

use parley_core::ApiError;
use parley_framework::{ListenError, RouteError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while setting up or running a conversation.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A route pattern failed to compile.
    #[error("Route error: {0}")]
    Route(#[from] RouteError),

    /// An outbound call made during setup failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The conversation stopped without terminating.
    #[error("Listen error: {0}")]
    Listen(#[from] ListenError),

    /// The configuration names a username but no outbound handle was given
    /// to resolve it.
    #[error("Cannot resolve username '{0}' without an outbound handle")]
    UnresolvableTarget(String),

    /// Neither a target nor a username is configured.
    #[error("No conversation target configured")]
    MissingTarget,

    /// A shutdown signal arrived before the conversation terminated.
    #[error("Interrupted by shutdown signal")]
    Interrupted,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
