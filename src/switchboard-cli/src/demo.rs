//! Built-in demo plugins.
//!
//! - `echo` accepts any command and reflects its arguments
//! - `notes` keeps an in-memory list of notes
//! - `notes-ui` renders the notes list and depends on `notes`

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;

use switchboard_plugins::{
    ActivationContext, CommandArgs, CommandOutput, Plugin, PluginCommandSpec, PluginError,
    PluginMetadata, PluginRegistry, Result,
};

/// Notes shared between `notes` and `notes-ui`.
pub type NoteStore = Arc<Mutex<Vec<String>>>;

/// Register every demo plugin with `registry`.
pub fn register_demo_plugins(registry: &PluginRegistry) -> Result<()> {
    let store = NoteStore::default();

    registry.register_plugin(Arc::new(EchoPlugin), EchoPlugin::metadata())?;
    registry.register_plugin(
        Arc::new(NotesPlugin::new(store.clone())),
        NotesPlugin::metadata(),
    )?;
    registry.register_plugin(Arc::new(NotesUiPlugin::new(store)), NotesUiPlugin::metadata())?;
    Ok(())
}

// ============================================================================
// echo
// ============================================================================

/// Reflects any command back to the caller.
pub struct EchoPlugin;

impl EchoPlugin {
    pub fn metadata() -> PluginMetadata {
        PluginMetadata::new("echo", "Echo")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_description("Repeats any command with its arguments")
    }
}

#[async_trait]
impl Plugin for EchoPlugin {
    async fn activate(&self, _ctx: &ActivationContext) -> Result<()> {
        Ok(())
    }

    async fn execute_command(&self, name: &str, args: &CommandArgs) -> Result<CommandOutput> {
        let text = if args.positional.is_empty() {
            name.to_string()
        } else {
            format!("{name}: {}", args.joined())
        };
        Ok(CommandOutput::text(text).with_data(json!({
            "command": name,
            "args": args.positional,
            "flags": args.flags,
        })))
    }
}

// ============================================================================
// notes
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NotesSettings {
    /// Maximum number of notes kept
    limit: usize,
}

impl Default for NotesSettings {
    fn default() -> Self {
        Self { limit: 100 }
    }
}

/// In-memory note taking.
pub struct NotesPlugin {
    store: NoteStore,
    limit: Mutex<usize>,
}

impl NotesPlugin {
    pub fn new(store: NoteStore) -> Self {
        Self {
            store,
            limit: Mutex::new(NotesSettings::default().limit),
        }
    }

    pub fn metadata() -> PluginMetadata {
        PluginMetadata::new("notes", "Notes")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_description("Keeps short notes for the session")
            .with_priority(1)
            .with_command(
                PluginCommandSpec::new("add", "Add a note")
                    .with_alias("new")
                    .with_usage("@notes:add <text>")
                    .with_priority(2),
            )
            .with_command(
                PluginCommandSpec::new("list", "List notes")
                    .with_alias("ls")
                    .with_priority(1),
            )
            .with_command(
                PluginCommandSpec::new("remove", "Remove a note by number")
                    .with_alias("rm")
                    .with_usage("@notes:remove <n>"),
            )
            .with_command(PluginCommandSpec::new("clear", "Remove every note"))
    }

    fn add(&self, args: &CommandArgs) -> Result<CommandOutput> {
        if args.positional.is_empty() {
            return Err(PluginError::InvalidArgument("missing <text>".to_string()));
        }

        let limit = *self.limit.lock();
        let mut notes = self.store.lock();
        if notes.len() >= limit {
            return Err(PluginError::execution_error(
                "notes",
                format!("note limit of {limit} reached"),
            ));
        }
        notes.push(args.joined());
        Ok(CommandOutput::text(format!("Added note #{}.", notes.len())))
    }

    fn list(&self) -> CommandOutput {
        let notes = self.store.lock();
        if notes.is_empty() {
            return CommandOutput::text("No notes.").with_data(json!([]));
        }

        let text = notes
            .iter()
            .enumerate()
            .map(|(i, note)| format!("{}. {note}", i + 1))
            .collect::<Vec<_>>()
            .join("\n");
        CommandOutput::text(text).with_data(json!(*notes))
    }

    fn remove(&self, args: &CommandArgs) -> Result<CommandOutput> {
        let raw = args.require(0, "n")?;
        let index: usize = raw
            .parse()
            .map_err(|_| PluginError::InvalidArgument(format!("'{raw}' is not a note number")))?;

        let mut notes = self.store.lock();
        if index == 0 || index > notes.len() {
            return Err(PluginError::InvalidArgument(format!("no note #{index}")));
        }
        let removed = notes.remove(index - 1);
        Ok(CommandOutput::text(format!("Removed: {removed}")))
    }
}

#[async_trait]
impl Plugin for NotesPlugin {
    async fn activate(&self, ctx: &ActivationContext) -> Result<()> {
        let settings: NotesSettings = ctx.config_as()?.unwrap_or_default();
        *self.limit.lock() = settings.limit;

        let store = self.store.clone();
        ctx.on_dispose("notes-store", move || {
            let count = store.lock().len();
            tracing::debug!("Releasing notes store with {} notes", count);
            Ok(())
        });
        Ok(())
    }

    async fn execute_command(&self, name: &str, args: &CommandArgs) -> Result<CommandOutput> {
        match name {
            "add" => self.add(args),
            "list" => Ok(self.list()),
            "remove" => self.remove(args),
            "clear" => {
                self.store.lock().clear();
                Ok(CommandOutput::text("Cleared all notes."))
            }
            other => Err(PluginError::unknown_command("notes", other)),
        }
    }
}

// ============================================================================
// notes-ui
// ============================================================================

/// Presentation for the notes store.
pub struct NotesUiPlugin {
    store: NoteStore,
}

impl NotesUiPlugin {
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }

    pub fn metadata() -> PluginMetadata {
        PluginMetadata::new("notes-ui", "Notes UI")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_description("Summaries and markdown views of notes")
            .depends_on("notes")
            .with_command(PluginCommandSpec::new("summary", "Count notes and show the latest"))
            .with_command(PluginCommandSpec::new("render", "Render notes as a markdown list"))
    }
}

#[async_trait]
impl Plugin for NotesUiPlugin {
    async fn activate(&self, _ctx: &ActivationContext) -> Result<()> {
        Ok(())
    }

    async fn execute_command(&self, name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
        let notes = self.store.lock();
        match name {
            "summary" => {
                let text = match notes.last() {
                    Some(latest) => format!("{} note(s); latest: {latest}", notes.len()),
                    None => "0 notes".to_string(),
                };
                Ok(CommandOutput::text(text).with_data(json!({ "count": notes.len() })))
            }
            "render" => {
                let markdown = notes
                    .iter()
                    .map(|note| format!("- {note}"))
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(CommandOutput::text(markdown))
            }
            other => Err(PluginError::unknown_command("notes-ui", other)),
        }
    }
}
