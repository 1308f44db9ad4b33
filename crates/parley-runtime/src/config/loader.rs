//! Configuration loader using figment.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables `parley.toml`
//! - `yaml-config`: enables `parley.yaml` / `parley.yml`
//!
//! Both features can be enabled simultaneously; if so, both file formats are
//! searched and loaded.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`parley.{profile}.toml` / `parley.{profile}.yaml`)
//! 3. Main config file (`parley.toml` / `parley.yaml`)
//! 4. Environment variables (`PARLEY_*`)
//! 5. Programmatic overrides ([`ConfigLoader::set`])
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `PARLEY_` prefix with `__` as
//! separator:
//!
//! - `PARLEY_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `PARLEY_CONVERSATION__TARGET=7513073974` → `conversation.target = 7513073974`
//! - `PARLEY_SESSION__STRING=1ApWa...` → `session.string = "1ApWa..."`
//!
//! # Example
//!
//! ```rust,ignore
//! use parley_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .set("conversation.strip", true)
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::ParleyConfig;

/// Environment variable prefix.
const ENV_PREFIX: &str = "PARLEY_";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting the `dev` and `prod` abbreviations.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads the profile from `PARLEY_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("PARLEY_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, merged last.
    overrides: Figment,
    /// Configuration profile.
    profile: Profile,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds current directory to search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds the user config directory (`~/.config/parley` on Linux).
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join("parley"))
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Overrides one value by its dotted key path.
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new()
    ///     .set("conversation.target", 7513073974_i64)
    ///     .set("logging.level", "debug")
    ///     .load()?;
    /// ```
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.overrides = self.overrides.merge(Serialized::default(key, value));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<ParleyConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: ParleyConfig = figment.extract().map_err(Box::new)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            strip = config.conversation.strip,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(ParleyConfig::default()));

        if let Some(path) = self.config_file.take() {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path));
            }
            info!(path = %path.display(), "Loading configuration file");
            figment = Self::merge_config_file(figment, &path)?;
        } else {
            figment = self.load_config_files(figment);
        }

        if self.load_env {
            trace!("Loading environment variables with {ENV_PREFIX} prefix");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => {
                let _ = figment;
                Err(ConfigError::UnsupportedFormat(ext.to_string()))
            }
        }
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("parley"));
        }
        paths
    }

    /// Searches one file format across all search paths.
    ///
    /// For each path and base name, a profile-specific variant is merged
    /// first, then the base file. Stops at the first base file found.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                let profile_path =
                    search_path.join(format!("{stem}.{}.{ext}", self.profile.as_str()));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = merge_fn(figment, &profile_path);
                }

                let base_path = search_path.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    return (merge_fn(figment, &base_path), true);
                }
            }
        }
        (figment, false)
    }

    /// Searches for and loads configuration files from search paths.
    #[allow(unused_mut)]
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["parley.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["parley.yaml", "parley.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!(paths = ?search_paths, "No configuration file found, using defaults");
        }
        figment
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<ParleyConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<ParleyConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(all(test, feature = "toml-config"))]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.logging.level, LogLevel::Info);
        assert!(config.conversation.target.is_none());
        assert!(!config.conversation.strip);
        assert!(config.session.string.is_none());
    }

    #[test]
    fn test_load_from_search_path() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "parley.toml",
            r#"
            [conversation]
            target = 42
            strip = true

            [logging]
            level = "debug"

            [logging.filters]
            parley_framework = "trace"
            "#,
        );

        let config = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.conversation.target, Some(42));
        assert!(config.conversation.strip);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(
            config.logging.filters.get("parley_framework"),
            Some(&LogLevel::Trace)
        );
    }

    #[test]
    fn test_profile_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "parley.production.toml",
            "[conversation]\nusername = \"price_bot\"\n",
        );
        write(dir.path(), "parley.toml", "[conversation]\nstrip = true\n");

        let config = ConfigLoader::new()
            .profile("prod")
            .search_path(dir.path())
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.conversation.username.as_deref(), Some("price_bot"));
        assert!(config.conversation.strip);
    }

    #[test]
    fn test_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "custom.toml", "[conversation]\ntarget = 1\n");

        let config = ConfigLoader::new()
            .file(&path)
            .without_env()
            .set("conversation.target", 2_i64)
            .load()
            .unwrap();

        assert_eq!(config.conversation.target, Some(2));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "parley.toml", "[conversation]\ntarget = 1\n");

        // SAFETY: no other test reads this variable.
        unsafe {
            std::env::set_var("PARLEY_CONVERSATION__TARGET", "7513073974");
        }
        let config = ConfigLoader::new().search_path(dir.path()).load();
        unsafe {
            std::env::remove_var("PARLEY_CONVERSATION__TARGET");
        }

        assert_eq!(config.unwrap().conversation.target, Some(7_513_073_974));
    }

    #[test]
    fn test_missing_and_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ConfigLoader::new()
            .file(dir.path().join("nope.toml"))
            .without_env()
            .load();
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));

        let path = write(dir.path(), "parley.ini", "target=1");
        let unsupported = ConfigLoader::new().file(&path).without_env().load();
        assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(ext)) if ext == "ini"));
    }

    #[test]
    fn test_invalid_value_fails_extraction() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "parley.toml", "[logging]\nlevel = \"loud\"\n");

        let result = ConfigLoader::new()
            .search_path(dir.path())
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::Extract(_))));
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("PROD"), Profile::Production);
        assert_eq!(Profile::parse("dev"), Profile::Development);
        assert_eq!(Profile::parse("staging").as_str(), "staging");
    }
}
