//! Configuration validation utilities.

use parley_session::SessionString;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ConversationConfig, LoggingConfig, ParleyConfig, SessionConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ParleyConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_conversation_config(&config.conversation)?;
    validate_session_config(&config.session)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    for module in logging.filters.keys() {
        if module.is_empty() || module.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: '{module}'"
            )));
        }
    }

    if matches!(logging.output, super::schema::LogOutput::File) && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    Ok(())
}

/// Validates the conversation target.
fn validate_conversation_config(conversation: &ConversationConfig) -> ConfigResult<()> {
    if let Some(username) = &conversation.username {
        return validate_username(username);
    }

    match conversation.target {
        None => Err(ConfigError::missing_field(
            "conversation.target or conversation.username",
        )),
        Some(0) => Err(ConfigError::validation(
            "conversation.target must be a non-zero identity",
        )),
        Some(_) => Ok(()),
    }
}

/// Checks the public username rules: 5 to 32 characters, letters, digits and
/// underscores, starting with a letter.
fn validate_username(username: &str) -> ConfigResult<()> {
    let name = username.strip_prefix('@').unwrap_or(username);
    let well_formed = (5..=32).contains(&name.len())
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !well_formed {
        return Err(ConfigError::validation(format!(
            "Invalid username '{username}': expected 5-32 letters, digits or underscores"
        )));
    }
    Ok(())
}

/// Validates the session string, if one is configured.
fn validate_session_config(session: &SessionConfig) -> ConfigResult<()> {
    if let Some(string) = &session.string {
        SessionString::decode(string)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{LogLevel, LogOutput};

    fn with_target(target: i64) -> ParleyConfig {
        let mut config = ParleyConfig::default();
        config.conversation.target = Some(target);
        config
    }

    #[test]
    fn test_validate_minimal_config() {
        assert!(validate_config(&with_target(7513073974)).is_ok());
    }

    #[test]
    fn test_validate_requires_target() {
        let result = validate_config(&ParleyConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));

        let result = validate_config(&with_target(0));
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_validate_username() {
        let mut config = ParleyConfig::default();
        for good in ["@price_bot", "tgdb_bot", "Alpha5"] {
            config.conversation.username = Some(good.to_string());
            assert!(validate_config(&config).is_ok(), "{good}");
        }
        for bad in ["bot", "_leading", "has space", "dash-bot"] {
            config.conversation.username = Some(bad.to_string());
            assert!(validate_config(&config).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_validate_session_string() {
        let mut config = with_target(1);
        config.session.string = Some("1AAAA".to_string());
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidSession(_))
        ));

        let session = SessionString::from_endpoint(2, None, &[1u8; 256]).unwrap();
        config.session.string = Some(session.to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_logging() {
        let mut config = with_target(1);
        config.logging.filters.insert("bad target".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());

        let mut config = with_target(1);
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "logging.file_path"
        ));
    }
}
