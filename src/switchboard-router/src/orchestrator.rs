//! Single entry point for raw user input.
//!
//! The orchestrator parses each line, sends commands to the
//! [`CommandRouter`], and hands everything else to a [`FreeTextHandler`].
//! It holds no global state; the host constructs one and owns it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use switchboard_commands::{Command, parse};
use switchboard_plugins::CommandAction;

use crate::error::Result;
use crate::executor::{CommandRouter, ExecutionResult};

/// Receives input that is not a command.
#[async_trait]
pub trait FreeTextHandler: Send + Sync {
    /// Produce a reply for `input`.
    async fn handle(&self, input: &str) -> Result<String>;
}

/// What the orchestrator did with a line of input.
#[derive(Debug, Clone)]
pub enum Response {
    /// Blank input.
    Empty,

    /// Input parsed as a command and was executed.
    Command {
        command: Command,
        result: ExecutionResult,
    },

    /// Input was free text and the handler replied.
    FreeText { reply: String },

    /// Input was free text and no handler is installed.
    Unhandled { input: String },
}

impl Response {
    /// Action requested by a command, if any.
    pub fn action(&self) -> Option<CommandAction> {
        match self {
            Self::Command { result, .. } => result.action(),
            Self::Empty | Self::FreeText { .. } | Self::Unhandled { .. } => None,
        }
    }

    pub fn is_command(&self) -> bool {
        matches!(self, Self::Command { .. })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Command { result, .. } => write!(f, "{result}"),
            Self::FreeText { reply } => write!(f, "{reply}"),
            Self::Unhandled { .. } => write!(
                f,
                "Not a command. Use @agent:command or /command, or /help to list commands."
            ),
        }
    }
}

/// Routes raw input to commands or free-text handling.
pub struct Orchestrator {
    router: CommandRouter,
    fallback: Option<Arc<dyn FreeTextHandler>>,
}

impl Orchestrator {
    /// Create an orchestrator without a free-text handler.
    pub fn new(router: CommandRouter) -> Self {
        Self {
            router,
            fallback: None,
        }
    }

    /// Install the handler for non-command input.
    pub fn with_fallback(mut self, handler: Arc<dyn FreeTextHandler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// Handle one line of input.
    ///
    /// Only the free-text handler can fail; command problems are reported in
    /// the returned [`ExecutionResult`].
    pub async fn handle_input(&self, input: &str) -> Result<Response> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Response::Empty);
        }

        if let Some(command) = parse(input) {
            let result = self.router.execute(&command).await;
            return Ok(Response::Command { command, result });
        }

        match &self.fallback {
            Some(handler) => {
                tracing::debug!("Forwarding free text ({} chars)", input.len());
                let reply = handler.handle(input).await?;
                Ok(Response::FreeText { reply })
            }
            None => Ok(Response::Unhandled {
                input: input.to_string(),
            }),
        }
    }

    /// Deactivate every plugin before the host exits.
    pub async fn shutdown(&self) {
        let results = self.router.registry().deactivate_all().await;
        for (id, deactivated) in results {
            if !deactivated {
                tracing::warn!("Plugin {} did not shut down cleanly", id);
            }
        }
        tracing::info!("Orchestrator shut down");
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("router", &self.router)
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
