//! Error types shared by the Parley core.
//!
//! Framework-level errors (routing, extraction) live in `parley-framework`.

use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by [`Outbound`](crate::Outbound) calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The client is not connected to the transport.
    #[error("client is not connected")]
    NotConnected,

    /// The remote side rejected the call.
    #[error("rpc error ({code}): {message}")]
    Rpc {
        /// Transport error code.
        code: i32,
        /// Transport error message.
        message: String,
    },

    /// A username did not resolve to any peer.
    #[error("username '{0}' could not be resolved")]
    UnresolvedUsername(String),

    /// The peer has the wrong type for this call (e.g. starting a non-bot).
    #[error("peer {peer} does not support {operation}")]
    UnsupportedPeer {
        /// The peer, formatted.
        peer: String,
        /// The attempted operation.
        operation: &'static str,
    },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates a catch-all API error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

// =============================================================================
// Link Errors
// =============================================================================

/// Errors that can occur while parsing a message deep link.
#[derive(Debug, Clone, Error)]
pub enum LinkError {
    /// The input is not a valid URL.
    #[error("invalid deep link '{link}': {reason}")]
    InvalidUrl {
        /// The rejected input.
        link: String,
        /// Parser message.
        reason: String,
    },

    /// The message segment is not an integer.
    #[error("message id '{0}' is not an integer")]
    InvalidMessageId(String),

    /// The URL path has no username segment.
    #[error("deep link has no username")]
    MissingUsername,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for outbound API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for deep-link parsing.
pub type LinkResult<T> = Result<T, LinkError>;
