//! Switchboard CLI entry point.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;

use switchboard_cli::logging::init_logging;
use switchboard_cli::{Cli, bootstrap, run_batch, run_interactive};
use switchboard_router::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    let orchestrator = bootstrap(config)
        .await
        .context("failed to start Switchboard")?;

    let mut stdout = std::io::stdout();
    let outcome = if cli.exec.is_empty() {
        let prompt = std::io::stdin().is_terminal().then_some("> ");
        let stdin = BufReader::new(tokio::io::stdin());
        run_interactive(&orchestrator, stdin, &mut stdout, prompt).await
    } else {
        run_batch(&orchestrator, &cli.exec, &mut stdout).await
    };

    orchestrator.shutdown().await;
    outcome
}
