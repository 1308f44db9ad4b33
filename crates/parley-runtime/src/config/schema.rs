//! Configuration schema definitions.
//!
//! ```toml
//! [conversation]
//! username = "price_bot"
//! strip = true
//!
//! [session]
//! string = "1ApWa..."
//!
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [logging.filters]
//! parley_framework = "trace"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The conversation to automate.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Account credentials.
    #[serde(default)]
    pub session: SessionConfig,
}

// =============================================================================
// Conversation
// =============================================================================

/// Who to converse with and how to read their messages.
///
/// Exactly one of `target` and `username` is needed; when both are set the
/// username wins, since resolving it yields the peer type as well.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Numeric identity of the counterpart.
    #[serde(default)]
    pub target: Option<i64>,

    /// Public username of the counterpart, with or without a leading `@`.
    #[serde(default)]
    pub username: Option<String>,

    /// Strip non-ASCII characters and whitespace before matching.
    #[serde(default)]
    pub strip: bool,
}

/// Account credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Portable session string.
    #[serde(default)]
    pub string: Option<String>,
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Span lifecycle events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-module levels, e.g. `parley_framework = "trace"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the lowercase name of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Span lifecycle events to log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}
