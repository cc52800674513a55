//! Composition root and the interactive loop.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use switchboard_plugins::{CommandAction, PluginRegistry, TracingEventSink};
use switchboard_router::{AppConfig, CommandRouter, FreeTextHandler, Orchestrator};

use crate::demo::register_demo_plugins;

/// Marker printed when a command clears the conversation.
pub const CLEARED_MARKER: &str = "--- conversation cleared ---";

/// Stand-in for the language model; explains how to issue commands.
#[derive(Debug, Default)]
pub struct OfflineAssistant;

#[async_trait]
impl FreeTextHandler for OfflineAssistant {
    async fn handle(&self, input: &str) -> switchboard_router::Result<String> {
        tracing::debug!("No assistant connected, dropping {} chars of free text", input.len());
        Ok("No assistant is connected. Commands look like @agent:command or /command; \
            try /help."
            .to_string())
    }
}

/// Build the registry, router and orchestrator, register the demo plugins
/// and activate the configured startup set.
pub async fn bootstrap(config: AppConfig) -> anyhow::Result<Orchestrator> {
    let AppConfig {
        plugins: plugin_config,
        router: router_config,
    } = config;

    let startup = plugin_config.activate_on_startup.clone();
    let registry = Arc::new(PluginRegistry::new(plugin_config, Arc::new(TracingEventSink)));
    register_demo_plugins(&registry)?;

    for id in &startup {
        if !registry.activate_plugin(id).await {
            let reason = registry
                .error_message(id)
                .unwrap_or_else(|| "not registered".to_string());
            tracing::warn!("Startup activation of {} failed: {}", id, reason);
        }
    }

    let router = CommandRouter::new(registry, router_config);
    Ok(Orchestrator::new(router).with_fallback(Arc::new(OfflineAssistant)))
}

/// Whether the session should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Handle one line and print the response.
pub async fn respond<W: Write>(
    orchestrator: &Orchestrator,
    line: &str,
    out: &mut W,
) -> anyhow::Result<Flow> {
    let response = match orchestrator.handle_input(line).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Input handling failed: {}", e);
            writeln!(out, "error: {e}")?;
            return Ok(Flow::Continue);
        }
    };

    let text = response.to_string();
    if !text.is_empty() {
        writeln!(out, "{text}")?;
    }

    match response.action() {
        Some(CommandAction::EndSession) => Ok(Flow::Exit),
        Some(CommandAction::ClearConversation) => {
            writeln!(out, "{CLEARED_MARKER}")?;
            Ok(Flow::Continue)
        }
        None => Ok(Flow::Continue),
    }
}

/// Run each input in order, stopping early on `/exit`.
pub async fn run_batch<W: Write>(
    orchestrator: &Orchestrator,
    inputs: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    for input in inputs {
        if respond(orchestrator, input, out).await? == Flow::Exit {
            break;
        }
    }
    Ok(())
}

/// Read lines from `reader` until end of input or `/exit`.
///
/// `prompt` is written before each line when set.
pub async fn run_interactive<R, W>(
    orchestrator: &Orchestrator,
    reader: R,
    out: &mut W,
    prompt: Option<&str>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();

    loop {
        if let Some(prompt) = prompt {
            write!(out, "{prompt}")?;
            out.flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        if respond(orchestrator, &line, out).await? == Flow::Exit {
            break;
        }
    }

    Ok(())
}
