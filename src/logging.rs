//! Logging set-up. Installed once at start-up; nothing re-initializes it.

use tracing_subscriber::EnvFilter;

use crate::constants::log::{DEFAULT_LEVEL, LOG_ENV};

/// Inputs that decide the log filter.
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub debug: bool,
    /// Level from the configuration file, if any.
    pub configured_level: Option<String>,
}

impl LogSettings {
    /// Filter directive: `ORG_SECRETS_LOG`, then `--debug`, then the config
    /// file, then `warn`.
    pub fn directive(&self) -> String {
        if let Ok(value) = std::env::var(LOG_ENV)
            && !value.trim().is_empty()
        {
            return value;
        }
        if self.debug {
            return "debug".to_string();
        }
        self.configured_level
            .clone()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
    }
}

/// Install the global subscriber. Logs go to stderr so CSV or summary output
/// on stdout stays clean. Calling this twice is a no-op.
pub fn init(settings: &LogSettings) {
    let directive = settings.directive();
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
