//! Router error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from configuration loading and free-text handling.
///
/// Command execution never produces these; it reports through
/// [`ExecutionResult`](crate::ExecutionResult).
#[derive(Error, Debug)]
pub enum RouterError {
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The free-text handler failed.
    #[error("Free-text handler failed: {0}")]
    FreeText(String),
}

impl RouterError {
    /// Create a free-text handler error.
    pub fn free_text(message: impl Into<String>) -> Self {
        Self::FreeText(message.into())
    }
}

impl From<toml::de::Error> for RouterError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
