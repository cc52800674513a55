//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including trace-level details
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Switchboard - route `@agent:command` and `/command` input to plugins.
///
/// Without `--exec`, reads one line at a time from stdin until `/exit`.
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the per-user config.toml when present)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level for stderr output
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose output (same as --log-level debug)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Run this input and exit; may be repeated
    #[arg(long = "exec", short = 'e', value_name = "INPUT")]
    pub exec: Vec<String>,
}
