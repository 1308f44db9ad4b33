//! Error types for the Parley framework.

use thiserror::Error;

/// A type-erased error returned by a failing handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building the route table.
///
/// These are setup errors: a conversation with a broken route must not start,
/// because a message meant for that route would fall through to a
/// lower-priority one.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The pattern is not a valid regular expression.
    #[error("route pattern `{pattern}` failed to compile: {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler error.
        #[source]
        source: regex::Error,
    },
}

/// Errors that can occur during context extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The handler asked for an outbound handle but none is configured.
    #[error("no outbound handle is configured for this conversation")]
    OutboundUnavailable,

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Errors that end [`Conversation::listen`](crate::Conversation::listen)
/// without a termination outcome.
#[derive(Debug, Clone, Error)]
pub enum ListenError {
    /// Every listener was dropped by the update source.
    #[error("update source closed before the conversation terminated")]
    SourceClosed,
}

/// A message could not be handed to the dispatch loop because the loop has
/// ended.
#[derive(Debug, Clone, Error)]
#[error("dispatch loop has ended, message {id} was dropped")]
pub struct HandoffError {
    /// Id of the dropped message.
    pub id: i32,
}

/// Result type for route registration.
pub type RouteResult<T> = Result<T, RouteError>;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for listening.
pub type ListenResult<T> = Result<T, ListenError>;
