//! Core plugin types and traits.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use switchboard_commands::{Command, FlagValue};

use crate::Result;
use crate::context::ActivationContext;

/// Static description of a plugin. Immutable after registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Plugin unique identifier, also the `@agent` used to address it
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Version string
    #[serde(default = "default_version")]
    pub version: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Ids of plugins that must be active before this one
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Suggestion priority; higher ranks first on equal distance
    #[serde(default)]
    pub priority: i32,

    /// Commands this plugin declares. Empty means any command name is accepted.
    #[serde(default)]
    pub commands: Vec<PluginCommandSpec>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

impl PluginMetadata {
    /// Create metadata with an id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: default_version(),
            description: String::new(),
            dependencies: Vec::new(),
            priority: 0,
            commands: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a dependency on another plugin id.
    pub fn depends_on(mut self, plugin_id: impl Into<String>) -> Self {
        self.dependencies.push(plugin_id.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Declare a command.
    pub fn with_command(mut self, command: PluginCommandSpec) -> Self {
        self.commands.push(command);
        self
    }

    /// Whether `plugin_id` is a declared dependency.
    pub fn depends_on_plugin(&self, plugin_id: &str) -> bool {
        self.dependencies.iter().any(|d| d == plugin_id)
    }

    /// Find a declared command by name or alias.
    pub fn find_command(&self, name: &str) -> Option<&PluginCommandSpec> {
        self.commands.iter().find(|c| c.matches(name))
    }

    /// Whether the plugin handles `name`.
    ///
    /// Plugins that declare no commands accept every name.
    pub fn accepts_command(&self, name: &str) -> bool {
        self.commands.is_empty() || self.find_command(name).is_some()
    }
}

/// A command declared by a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginCommandSpec {
    /// Command name (without the `@agent:` prefix)
    pub name: String,

    /// Command aliases
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Command description
    #[serde(default)]
    pub description: String,

    /// Usage example
    #[serde(default)]
    pub usage: Option<String>,

    /// Suggestion priority
    #[serde(default)]
    pub priority: i32,
}

impl PluginCommandSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: description.into(),
            usage: None,
            priority: 0,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Check if this command matches a name or alias.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Get all names for this command (primary + aliases).
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Plugin lifecycle state.
///
/// ```text
/// Discovered -> Registered -> Activating -> Active -> Deactivating -> Inactive
///                                  \
///                                   -> ActivationFailed (retryable)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Known to the host but not yet registered
    Discovered,
    /// Registered, never activated
    Registered,
    /// Activation in progress
    Activating,
    /// Active and accepting commands
    Active,
    /// Activation failed; may be retried
    ActivationFailed,
    /// Deactivation in progress
    Deactivating,
    /// Deactivated
    Inactive,
}

impl PluginState {
    /// All states, in lifecycle order.
    pub const ALL: [PluginState; 7] = [
        Self::Discovered,
        Self::Registered,
        Self::Activating,
        Self::Active,
        Self::ActivationFailed,
        Self::Deactivating,
        Self::Inactive,
    ];

    /// An activation or deactivation is in flight.
    pub fn is_transitional(self) -> bool {
        match self {
            Self::Activating | Self::Deactivating => true,
            Self::Discovered
            | Self::Registered
            | Self::Active
            | Self::ActivationFailed
            | Self::Inactive => false,
        }
    }

    /// Nothing is running; deactivation has nothing to tear down.
    pub fn is_dormant(self) -> bool {
        match self {
            Self::Discovered | Self::Registered | Self::ActivationFailed | Self::Inactive => true,
            Self::Activating | Self::Active | Self::Deactivating => false,
        }
    }

    /// Parse a state name as printed by [`fmt::Display`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.to_string().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovered => write!(f, "discovered"),
            Self::Registered => write!(f, "registered"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
            Self::ActivationFailed => write!(f, "activation_failed"),
            Self::Deactivating => write!(f, "deactivating"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Arguments handed to [`Plugin::execute_command`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArgs {
    /// Positional arguments in their original order
    pub positional: Vec<String>,

    /// `--key[=value]` flags
    pub flags: BTreeMap<String, FlagValue>,
}

impl CommandArgs {
    pub fn new(positional: Vec<String>) -> Self {
        Self {
            positional,
            flags: BTreeMap::new(),
        }
    }

    pub fn from_command(command: &Command) -> Self {
        Self {
            positional: command.positional_args().to_vec(),
            flags: command.flags().clone(),
        }
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: FlagValue) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    /// Positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Positional argument at `index`, or an [`InvalidArgument`] error naming it.
    ///
    /// [`InvalidArgument`]: crate::PluginError::InvalidArgument
    pub fn require(&self, index: usize, name: &str) -> Result<&str> {
        self.get(index)
            .ok_or_else(|| crate::PluginError::InvalidArgument(format!("missing <{name}>")))
    }

    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// String value of a `--key=value` flag.
    pub fn flag_value(&self, key: &str) -> Option<&str> {
        self.flags.get(key).and_then(FlagValue::as_str)
    }

    /// Whether a flag is set and not explicitly false.
    pub fn has_flag(&self, key: &str) -> bool {
        self.flags.get(key).is_some_and(FlagValue::is_enabled)
    }

    /// All positional arguments joined by a single space.
    pub fn joined(&self) -> String {
        self.positional.join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.flags.is_empty()
    }
}

/// Output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Message to display
    pub message: Option<String>,

    /// Structured data for the host
    pub data: Option<serde_json::Value>,

    /// Action the host should take
    pub action: Option<CommandAction>,
}

impl CommandOutput {
    /// Create an output with a message.
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Create an output with nothing to display.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add data to the output.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Add an action to the output.
    pub fn with_action(mut self, action: CommandAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Actions a command can request from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandAction {
    /// Clear the conversation history
    ClearConversation,
    /// End the interactive session
    EndSession,
}

/// Trait every plugin implements.
///
/// Plugins are shared between the registry and in-flight calls, so methods
/// take `&self`; use interior mutability for state.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Bring the plugin up. Resources acquired here should be registered on
    /// `ctx` so they are released on deactivation.
    async fn activate(&self, ctx: &ActivationContext) -> Result<()>;

    /// Tear the plugin down.
    async fn deactivate(&self) -> Result<()> {
        Ok(())
    }

    /// Execute a command.
    async fn execute_command(&self, name: &str, args: &CommandArgs) -> Result<CommandOutput>;
}
