//! Tracing subscriber setup.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, LogLevel};

/// Environment variable holding a filter directive for Switchboard.
pub const LOG_ENV: &str = "SWITCHBOARD_LOG";

/// Resolve the filter directive.
///
/// Precedence: `--verbose`, then `--log-level`, then `SWITCHBOARD_LOG`, then
/// `RUST_LOG`, then the default level.
pub fn filter_directive(
    level: Option<LogLevel>,
    verbose: bool,
    switchboard_log: Option<String>,
    rust_log: Option<String>,
) -> String {
    if verbose {
        return LogLevel::Debug.as_filter_str().to_string();
    }
    if let Some(level) = level {
        return level.as_filter_str().to_string();
    }

    switchboard_log
        .or(rust_log)
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| LogLevel::default().as_filter_str().to_string())
}

/// Install the global subscriber, writing to stderr.
pub fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let directive = filter_directive(
        cli.log_level,
        cli.verbose,
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );

    let filter = EnvFilter::try_new(&directive)
        .map_err(|e| anyhow!("invalid log filter '{directive}': {e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
