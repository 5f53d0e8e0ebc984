//! Configuration file parsing and validation.
//!
//! The configuration file is optional. It sets the GitHub host, the default
//! log filter and the default provider filter for secret exports.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::constants::api::DEFAULT_HOSTNAME;
use crate::constants::log::DEFAULT_LEVEL;
use crate::errors::ConfigError;
use crate::models::AppFilter;
use crate::paths;

/// Configuration file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubSection,
    #[serde(default)]
    pub log: LogSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubSection {
    /// `github.com` or a GitHub Enterprise Server host.
    #[serde(default = "default_hostname")]
    pub hostname: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// A `tracing` filter directive such as `info` or `org_secrets=debug`.
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportSection {
    #[serde(default)]
    pub app: AppFilter,
}

fn default_hostname() -> String {
    DEFAULT_HOSTNAME.to_string()
}

fn default_level() -> String {
    DEFAULT_LEVEL.to_string()
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.github.hostname.trim().is_empty() {
            return Err(ConfigError::ParseError(
                "github.hostname cannot be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load the first config file found by [`paths::find_config_file`], or the
    /// defaults when there is none.
    pub fn load() -> Result<Self, ConfigError> {
        match paths::find_config_file() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}
