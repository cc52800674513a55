//! Plugin system error types.

use thiserror::Error;

use crate::guard::PluginOperation;

/// Plugin system errors.
#[derive(Error, Debug)]
pub enum PluginError {
    /// Plugin not found.
    #[error("Plugin not found: {0}")]
    NotFound(String),

    /// Plugin already exists.
    #[error("Plugin already exists: {0}")]
    AlreadyExists(String),

    /// Invalid plugin metadata.
    #[error("Invalid metadata for plugin '{plugin}': {message}")]
    InvalidMetadata { plugin: String, message: String },

    /// A declared dependency is not registered.
    #[error("Plugin '{plugin}' depends on '{dependency}', which is not registered")]
    MissingDependency { plugin: String, dependency: String },

    /// A declared dependency could not be activated.
    #[error("Plugin '{plugin}' could not activate dependency '{dependency}': {reason}")]
    DependencyFailed {
        plugin: String,
        dependency: String,
        reason: String,
    },

    /// Dependencies form a cycle.
    #[error("Dependency cycle detected for plugin '{plugin}': {}", cycle.join(" -> "))]
    DependencyCycle { plugin: String, cycle: Vec<String> },

    /// Plugin activation error.
    #[error("Failed to activate plugin '{plugin}': {message}")]
    ActivationError { plugin: String, message: String },

    /// Plugin deactivation error.
    #[error("Failed to deactivate plugin '{plugin}': {message}")]
    DeactivationError { plugin: String, message: String },

    /// Plugin execution error.
    #[error("Plugin execution error in '{plugin}': {message}")]
    ExecutionError { plugin: String, message: String },

    /// The plugin does not handle the requested command.
    #[error("Plugin '{plugin}' has no command '{command}'")]
    UnknownCommand { plugin: String, command: String },

    /// A command argument was missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A plugin call exceeded its deadline.
    #[error("Plugin '{plugin}' timed out during {operation} after {timeout_ms}ms")]
    Timeout {
        plugin: String,
        operation: PluginOperation,
        timeout_ms: u64,
    },

    /// A plugin call panicked.
    #[error("Plugin '{plugin}' panicked during {operation}: {message}")]
    Panicked {
        plugin: String,
        operation: PluginOperation,
        message: String,
    },

    /// Plugin is disabled.
    #[error("Plugin is disabled: {0}")]
    Disabled(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PluginError {
    /// Create an activation error.
    pub fn activation_error(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActivationError {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create a deactivation error.
    pub fn deactivation_error(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeactivationError {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create an execution error.
    pub fn execution_error(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExecutionError {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create an unknown command error.
    pub fn unknown_command(plugin: impl Into<String>, command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            plugin: plugin.into(),
            command: command.into(),
        }
    }

    /// Create an invalid metadata error.
    pub fn invalid_metadata(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from a deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
