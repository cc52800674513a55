//! Router and application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use switchboard_commands::DEFAULT_MAX_DISTANCE;
use switchboard_plugins::{PluginConfig, timeout_from_ms};

use crate::error::{Result, RouterError};

/// Router configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Deadline for a plugin command (in milliseconds, 0 = none)
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,

    /// Largest edit distance offered as a suggestion
    #[serde(default = "default_max_suggestion_distance")]
    pub max_suggestion_distance: usize,

    /// Number of suggestions shown per miss
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            execution_timeout_ms: default_execution_timeout_ms(),
            max_suggestion_distance: default_max_suggestion_distance(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl RouterConfig {
    /// Deadline applied to `execute_command`, if any.
    pub fn execution_timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.execution_timeout_ms)
    }
}

fn default_execution_timeout_ms() -> u64 {
    30_000
}

fn default_max_suggestion_distance() -> usize {
    DEFAULT_MAX_DISTANCE
}

fn default_max_suggestions() -> usize {
    3
}

/// Top-level configuration file.
///
/// ```toml
/// [plugins]
/// activation_timeout_ms = 5000
/// activate_on_startup = ["notes-ui"]
///
/// [plugins.plugin_configs.notes]
/// limit = 50
///
/// [router]
/// max_suggestions = 5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub plugins: PluginConfig,
    pub router: RouterConfig,
}

impl AppConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RouterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            RouterError::Config(message) => {
                RouterError::Config(format!("{}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// The per-user config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("switchboard").join("config.toml"))
    }

    /// Load `path` if given, otherwise the per-user file when it exists,
    /// otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}
