//! Handlers for the built-in `/` commands.

use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::json;
use switchboard_commands::builtin::{self, BuiltinKind, BuiltinSpec};
use switchboard_commands::{Command, format_command};
use switchboard_plugins::{
    CommandAction, CommandOutput, PluginError, PluginInstance, PluginState,
};

use crate::executor::{CommandRouter, ExecutionResult};

impl CommandRouter {
    pub(crate) async fn execute_builtin(&self, command: &Command) -> ExecutionResult {
        let name = command.command_name();

        let Some(spec) = builtin::lookup(name) else {
            return ExecutionResult::CommandNotFound {
                command: command.qualified_name(),
                suggestions: self.suggest(name, builtin::candidates()),
            };
        };

        let args = command.positional_args();
        let qualified = format!("/{}", spec.name);
        tracing::debug!("Running built-in {}", qualified);

        let result = match spec.kind {
            BuiltinKind::Help => self.help(args.first().map(String::as_str)),
            BuiltinKind::Clear => Ok(CommandOutput::text("Conversation cleared.")
                .with_action(CommandAction::ClearConversation)),
            BuiltinKind::Plugins => self.list_plugins(args.first().map(String::as_str)),
            BuiltinKind::Activate => return self.activate(&qualified, args).await,
            BuiltinKind::Deactivate => return self.deactivate(&qualified, args).await,
            BuiltinKind::Exit => {
                Ok(CommandOutput::text("Goodbye.").with_action(CommandAction::EndSession))
            }
        };

        match result {
            Ok(output) => ExecutionResult::Success {
                command: qualified,
                output,
            },
            Err(result) => result,
        }
    }

    fn help(&self, topic: Option<&str>) -> Result<CommandOutput, ExecutionResult> {
        let Some(topic) = topic else {
            return Ok(self.help_overview());
        };

        if let Some(id) = topic.strip_prefix('@') {
            return match self.registry().get_plugin(id) {
                Some(instance) => Ok(plugin_help(&instance)),
                None => Err(self.plugin_not_found(id)),
            };
        }

        let name = topic.trim_start_matches('/');
        match builtin::lookup(name) {
            Some(spec) => Ok(builtin_help(spec)),
            None => Err(ExecutionResult::CommandNotFound {
                command: format!("/{name}"),
                suggestions: self.suggest(name, builtin::candidates()),
            }),
        }
    }

    fn help_overview(&self) -> CommandOutput {
        let mut text = String::from("Built-in commands:\n");
        for spec in builtin::all() {
            let _ = writeln!(text, "  {:<22} {}", spec.usage, spec.description);
        }

        let active = self.registry().get_active_plugins();
        if !active.is_empty() {
            text.push_str("\nAgent commands:\n");
            for instance in &active {
                if instance.metadata.commands.is_empty() {
                    let _ = writeln!(
                        text,
                        "  {:<22} {}",
                        format!("@{}:<command>", instance.id),
                        instance.metadata.description
                    );
                }
                for spec in &instance.metadata.commands {
                    let _ = writeln!(
                        text,
                        "  {:<22} {}",
                        format!("@{}:{}", instance.id, spec.name),
                        spec.description
                    );
                }
            }
        }

        let commands: Vec<&str> = builtin::all().map(|spec| spec.name).collect();
        CommandOutput::text(text.trim_end()).with_data(json!({ "builtins": commands }))
    }

    fn list_plugins(&self, filter: Option<&str>) -> Result<CommandOutput, ExecutionResult> {
        let plugins = match filter {
            None => self.registry().get_all_plugins(),
            Some(name) => match PluginState::from_name(name) {
                Some(state) => self.registry().get_plugins_by_state(state),
                None => {
                    return Err(ExecutionResult::failed(
                        "/plugins",
                        PluginError::InvalidArgument(format!("unknown plugin state '{name}'")),
                    ));
                }
            },
        };

        if plugins.is_empty() {
            return Ok(CommandOutput::text("No plugins.").with_data(json!([])));
        }

        let mut text = String::new();
        for plugin in &plugins {
            let _ = write!(
                text,
                "{:<16} v{:<8} {:<18} {}",
                plugin.id,
                plugin.metadata.version,
                plugin.state.to_string(),
                plugin.metadata.name
            );
            if let Some(error) = plugin.error_message() {
                let _ = write!(text, " ({error})");
            }
            text.push('\n');
        }

        let data: Vec<serde_json::Value> = plugins
            .iter()
            .map(|plugin| {
                json!({
                    "id": plugin.id,
                    "name": plugin.metadata.name,
                    "version": plugin.metadata.version,
                    "state": plugin.state,
                    "dependencies": plugin.metadata.dependencies,
                    "error": plugin.error_message(),
                })
            })
            .collect();

        Ok(CommandOutput::text(text.trim_end()).with_data(json!(data)))
    }

    async fn activate(&self, qualified: &str, args: &[String]) -> ExecutionResult {
        let id = match target(qualified, args) {
            Ok(id) => id,
            Err(result) => return result,
        };
        let registry = self.registry();
        if !registry.is_registered(id) {
            return self.plugin_not_found(id);
        }

        if registry.activate_plugin(id).await {
            return ExecutionResult::Success {
                command: qualified.to_string(),
                output: CommandOutput::text(format!("Plugin '{id}' is active.")),
            };
        }

        let error = recorded_error(registry.get_plugin(id), || {
            PluginError::activation_error(id, "activation already in progress")
        });
        ExecutionResult::failed(qualified, error)
    }

    async fn deactivate(&self, qualified: &str, args: &[String]) -> ExecutionResult {
        let id = match target(qualified, args) {
            Ok(id) => id,
            Err(result) => return result,
        };
        let registry = self.registry();
        if !registry.is_registered(id) {
            return self.plugin_not_found(id);
        }

        if registry.deactivate_plugin(id).await {
            let state = registry
                .state_of(id)
                .map_or_else(|| "unregistered".to_string(), |s| s.to_string());
            return ExecutionResult::Success {
                command: qualified.to_string(),
                output: CommandOutput::text(format!("Plugin '{id}' is {state}.")),
            };
        }

        let state = registry.state_of(id).unwrap_or(PluginState::Discovered);
        ExecutionResult::failed(
            qualified,
            PluginError::deactivation_error(id, format!("plugin is {state}")),
        )
    }
}

/// The plugin id argument of `/activate` and `/deactivate`.
fn target<'a>(qualified: &str, args: &'a [String]) -> Result<&'a str, ExecutionResult> {
    args.first()
        .map(|id| id.trim_start_matches('@'))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ExecutionResult::failed(
                qualified,
                PluginError::InvalidArgument(format!(
                    "missing <plugin>; usage: {}",
                    format_command(qualified.trim_start_matches('/'), &["<plugin>"])
                )),
            )
        })
}

fn recorded_error(
    instance: Option<PluginInstance>,
    fallback: impl FnOnce() -> PluginError,
) -> Arc<PluginError> {
    instance
        .and_then(|instance| instance.error)
        .unwrap_or_else(|| Arc::new(fallback()))
}

fn builtin_help(spec: &BuiltinSpec) -> CommandOutput {
    let mut text = format!("{}\n  {}", spec.usage, spec.description);
    if !spec.aliases.is_empty() {
        let aliases: Vec<String> = spec.aliases.iter().map(|a| format!("/{a}")).collect();
        let _ = write!(text, "\n  Aliases: {}", aliases.join(", "));
    }
    CommandOutput::text(text)
}

fn plugin_help(instance: &PluginInstance) -> CommandOutput {
    let metadata = &instance.metadata;
    let mut text = format!(
        "@{} - {} v{} ({})",
        instance.id, metadata.name, metadata.version, instance.state
    );
    if !metadata.description.is_empty() {
        let _ = write!(text, "\n  {}", metadata.description);
    }
    if !metadata.dependencies.is_empty() {
        let _ = write!(text, "\n  Depends on: {}", metadata.dependencies.join(", "));
    }
    for spec in &metadata.commands {
        let usage = spec
            .usage
            .clone()
            .unwrap_or_else(|| format!("@{}:{}", instance.id, spec.name));
        let _ = write!(text, "\n  {:<22} {}", usage, spec.description);
    }
    CommandOutput::text(text)
}
