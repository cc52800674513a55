//! Command execution against the plugin registry.

use std::fmt;
use std::sync::Arc;

use switchboard_commands::fuzzy::did_you_mean;
use switchboard_commands::{Candidate, Command, Dialect, Suggestion, find_similar, parse};
use switchboard_plugins::{
    CommandAction, CommandArgs, CommandOutput, PluginError, PluginOperation, PluginRegistry,
    PluginState, guarded,
};

use crate::config::RouterConfig;

/// Outcome of executing a command.
///
/// Every path through the router ends in one of these; nothing is thrown.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// The command ran.
    Success {
        /// Qualified command name
        command: String,
        output: CommandOutput,
    },

    /// No plugin is registered under the addressed id.
    PluginNotFound {
        plugin_id: String,
        suggestions: Vec<Suggestion>,
    },

    /// The plugin exists but is not active.
    PluginInactive {
        plugin_id: String,
        state: PluginState,
    },

    /// The target does not have a command by that name.
    CommandNotFound {
        /// Qualified command name as typed
        command: String,
        suggestions: Vec<Suggestion>,
    },

    /// The command ran and failed.
    Failed {
        /// Qualified command name
        command: String,
        error: Arc<PluginError>,
    },
}

impl ExecutionResult {
    /// Create a failed result.
    pub fn failed(command: impl Into<String>, error: impl Into<Arc<PluginError>>) -> Self {
        Self::Failed {
            command: command.into(),
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Output of a successful command.
    pub fn output(&self) -> Option<&CommandOutput> {
        match self {
            Self::Success { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Action requested by a successful command.
    pub fn action(&self) -> Option<CommandAction> {
        self.output().and_then(|output| output.action)
    }

    /// Suggestions attached to a miss.
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            Self::PluginNotFound { suggestions, .. } | Self::CommandNotFound { suggestions, .. } => {
                suggestions
            }
            _ => &[],
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { output, .. } => {
                write!(f, "{}", output.message.as_deref().unwrap_or_default())
            }
            Self::PluginNotFound {
                plugin_id,
                suggestions,
            } => {
                write!(f, "Unknown agent '@{plugin_id}'.")?;
                write_hint(f, suggestions, "@")
            }
            Self::PluginInactive { plugin_id, state } => write!(
                f,
                "Agent '@{plugin_id}' is not active ({state}). Run /activate {plugin_id} first."
            ),
            Self::CommandNotFound {
                command,
                suggestions,
            } => {
                write!(f, "Unknown command '{command}'.")?;
                write_hint(f, suggestions, suggestion_prefix(command))
            }
            Self::Failed { command, error } => write!(f, "Command {command} failed: {error}"),
        }
    }
}

fn write_hint(f: &mut fmt::Formatter<'_>, suggestions: &[Suggestion], prefix: &str) -> fmt::Result {
    match did_you_mean(suggestions, prefix, suggestions.len()) {
        Some(hint) => write!(f, " {hint}"),
        None => Ok(()),
    }
}

/// `@git:` for `@git:comit`, `/` for `/hepl`.
fn suggestion_prefix(command: &str) -> &str {
    match command.find(':') {
        Some(index) if command.starts_with('@') => &command[..=index],
        _ => "/",
    }
}

/// Routes parsed commands to plugins or built-in handlers.
#[derive(Debug, Clone)]
pub struct CommandRouter {
    registry: Arc<PluginRegistry>,
    config: RouterConfig,
}

impl CommandRouter {
    /// Create a router over `registry`.
    pub fn new(registry: Arc<PluginRegistry>, config: RouterConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Parse and execute `input`. Returns `None` if it is not a command.
    pub async fn execute_input(&self, input: &str) -> Option<ExecutionResult> {
        let command = parse(input)?;
        Some(self.execute(&command).await)
    }

    /// Execute a parsed command.
    pub async fn execute(&self, command: &Command) -> ExecutionResult {
        tracing::debug!("Executing {}", command.qualified_name());
        match command.dialect() {
            Dialect::Agent => self.execute_plugin_command(command).await,
            Dialect::Slash => self.execute_builtin(command).await,
        }
    }

    async fn execute_plugin_command(&self, command: &Command) -> ExecutionResult {
        let plugin_id = command.agent_id();

        let Some(instance) = self.registry.get_plugin(plugin_id) else {
            tracing::debug!("No plugin registered as {}", plugin_id);
            return self.plugin_not_found(plugin_id);
        };

        if instance.state != PluginState::Active {
            return ExecutionResult::PluginInactive {
                plugin_id: plugin_id.to_string(),
                state: instance.state,
            };
        }

        let requested = command.command_name();
        if !instance.metadata.accepts_command(requested) {
            let candidates = instance.metadata.commands.iter().flat_map(|spec| {
                spec.all_names()
                    .map(move |name| Candidate::new(name, spec.priority))
            });
            return ExecutionResult::CommandNotFound {
                command: command.qualified_name(),
                suggestions: self.suggest(requested, candidates),
            };
        }

        // Aliases are resolved so plugins only see canonical names
        let name = instance
            .metadata
            .find_command(requested)
            .map_or(requested, |spec| spec.name.as_str());
        let qualified = format!("@{plugin_id}:{name}");
        let args = CommandArgs::from_command(command);

        tracing::debug!("Routing {} to plugin {}", qualified, plugin_id);
        let result = guarded(
            plugin_id,
            PluginOperation::Execute,
            self.config.execution_timeout(),
            instance.implementation.execute_command(name, &args),
        )
        .await;

        match result {
            Ok(output) => ExecutionResult::Success {
                command: qualified,
                output,
            },
            Err(error) => {
                tracing::warn!("Command {} failed: {}", qualified, error);
                ExecutionResult::failed(qualified, error)
            }
        }
    }

    pub(crate) fn plugin_not_found(&self, plugin_id: &str) -> ExecutionResult {
        let plugins = self.registry.get_all_plugins();
        let candidates = plugins
            .iter()
            .map(|p| Candidate::new(&p.id, p.metadata.priority));

        ExecutionResult::PluginNotFound {
            plugin_id: plugin_id.to_string(),
            suggestions: self.suggest(plugin_id, candidates),
        }
    }

    /// Ranked suggestions for `name`, capped at the configured count.
    pub(crate) fn suggest<'a, I>(&self, name: &str, candidates: I) -> Vec<Suggestion>
    where
        I: IntoIterator<Item = Candidate<'a>>,
    {
        let mut suggestions =
            find_similar(name, candidates, self.config.max_suggestion_distance);
        suggestions.truncate(self.config.max_suggestions);
        suggestions
    }
}
