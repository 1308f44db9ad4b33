//! Conversation orchestration.
//!
//! [`ParleyRuntime`] turns a validated configuration into a ready
//! [`Conversation`] and runs it until a handler terminates it or the process
//! receives a shutdown signal.
//!
//! ```rust,ignore
//! let runtime = ParleyRuntime::builder()
//!     .config_file("config/parley.toml")
//!     .profile("production")
//!     .build()?;
//! ```

use std::future::Future;
use std::path::Path;

use serde::Serialize;
use tokio::signal;
use tracing::{error, info, warn};

use parley_core::{BoxedOutbound, UpdateSource};
use parley_framework::{Conversation, ListenReport};
use parley_session::SessionString;

use crate::config::{ConfigLoader, ParleyConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Runs conversations described by a [`ParleyConfig`].
#[derive(Debug, Clone)]
pub struct ParleyRuntime {
    config: ParleyConfig,
}

impl ParleyRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already validated configuration and
    /// initializes logging from it.
    pub fn from_config(config: ParleyConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            strip = config.conversation.strip,
            "Runtime initialized from configuration"
        );

        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ParleyConfig {
        &self.config
    }

    /// Decodes the configured session string.
    pub fn session(&self) -> RuntimeResult<Option<SessionString>> {
        let Some(string) = &self.config.session.string else {
            return Ok(None);
        };
        let session = SessionString::decode(string).map_err(crate::ConfigError::from)?;
        info!(dc = session.dc_id(), endpoint = %session.endpoint(), "Loaded session");
        Ok(Some(session))
    }

    /// Builds the configured conversation, without routes.
    ///
    /// A configured username is resolved through `outbound`; a numeric target
    /// is used as is. The outbound handle, when given, is exposed to handlers.
    pub async fn conversation(&self, outbound: Option<BoxedOutbound>) -> RuntimeResult<Conversation> {
        let settings = &self.config.conversation;

        let conversation = match (&settings.username, settings.target, outbound) {
            (Some(username), _, Some(outbound)) => {
                Conversation::resolve(username, outbound).await?
            }
            (Some(username), None, None) => {
                return Err(RuntimeError::UnresolvableTarget(username.clone()));
            }
            (_, Some(target), outbound) => {
                let conversation = Conversation::new(target);
                match outbound {
                    Some(outbound) => conversation.with_outbound(outbound),
                    None => conversation,
                }
            }
            (None, None, _) => return Err(RuntimeError::MissingTarget),
        };

        Ok(conversation.strip(settings.strip))
    }

    /// Listens until the conversation terminates or Ctrl+C / SIGTERM arrives.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Interrupted`] on a shutdown signal and
    /// [`RuntimeError::Listen`] if the source closes.
    pub async fn run(
        &self,
        conversation: Conversation,
        source: &dyn UpdateSource,
    ) -> RuntimeResult<ListenReport> {
        self.run_until(conversation, source, wait_for_shutdown()).await
    }

    /// Listens until the conversation terminates or `shutdown` resolves.
    pub async fn run_until<F>(
        &self,
        conversation: Conversation,
        source: &dyn UpdateSource,
        shutdown: F,
    ) -> RuntimeResult<ListenReport>
    where
        F: Future<Output = ()>,
    {
        info!(target_id = conversation.target(), "Conversation started");

        tokio::select! {
            result = conversation.listen(source) => {
                let report = result?;
                info!(
                    received = report.received,
                    handled = report.handled,
                    failed = report.failed,
                    terminated_by = report.terminated_by.as_deref().unwrap_or_default(),
                    "Conversation finished"
                );
                Ok(report)
            }
            () = shutdown => {
                warn!("Shutdown requested before the conversation finished");
                Err(RuntimeError::Interrupted)
            }
        }
    }
}

/// Waits for Ctrl+C, or SIGTERM on Unix.
///
/// If no signal handler can be installed, waits forever and leaves stopping
/// to the conversation itself.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    result = signal::ctrl_c() => {
                        if let Err(e) = result {
                            error!(error = %e, "Failed to listen for Ctrl+C");
                            std::future::pending::<()>().await;
                        }
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`ParleyRuntime`] with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Creates a builder searching the current and user config directories.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir().with_user_config_dir(),
        }
    }

    /// Starts from a custom loader.
    pub fn with_loader(loader: ConfigLoader) -> Self {
        Self {
            config_loader: loader,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables environment variable overrides.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Overrides one configuration value by its dotted key path.
    pub fn set<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.config_loader = self.config_loader.set(key, value);
        self
    }

    /// Loads and validates the configuration, then builds the runtime.
    pub fn build(self) -> RuntimeResult<ParleyRuntime> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;
        Ok(ParleyRuntime::from_config(config))
    }
}
