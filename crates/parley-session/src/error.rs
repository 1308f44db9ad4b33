//! Error types for the session-string codec.

use thiserror::Error;

/// Errors produced while encoding or decoding session strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The string is empty.
    #[error("session string is empty")]
    Empty,

    /// The version marker is not supported.
    #[error("unsupported session string version '{0}'")]
    UnsupportedVersion(char),

    /// The payload is not valid URL-safe base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded record has an unexpected size.
    #[error("session record is {actual} bytes, expected {expected}")]
    InvalidLength {
        /// Required size.
        expected: usize,
        /// Actual size.
        actual: usize,
    },

    /// The endpoint is an IPv6 address.
    #[error("IPv6 endpoints are not supported: {0}")]
    Ipv6Unsupported(String),

    /// The authorization key has the wrong size.
    #[error("authorization key is {0} bytes, expected 256")]
    InvalidKeyLength(usize),

    /// No endpoint was given and the datacenter is not in the production table.
    #[error("unknown datacenter {0}")]
    UnknownDatacenter(u8),

    /// The endpoint could not be parsed.
    #[error("invalid endpoint '{0}', expected 'ip:port' or 'ip port'")]
    InvalidEndpoint(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
