//! Configuration module for the Parley runtime.
//!
//! Loads the conversation target, normalization flag, session string and
//! logging settings from files and the environment, then validates them.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ConversationConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, ParleyConfig,
    SessionConfig, SpanEventConfig,
};
pub use validation::validate_config;
