//! Built-in slash commands.
//!
//! The table here only describes the commands. Handlers live with the router,
//! which has access to the plugin registry.
//!
//! # Available Commands
//!
//! - `/help [command]` - List commands or describe one
//! - `/clear` - Clear the conversation
//! - `/plugins [state]` - List registered plugins
//! - `/activate <plugin>` - Activate a plugin and its dependencies
//! - `/deactivate <plugin>` - Deactivate a plugin and its dependents
//! - `/exit` - Leave the session

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fuzzy::Candidate;

/// Identifies a built-in command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinKind {
    Help,
    Clear,
    Plugins,
    Activate,
    Deactivate,
    Exit,
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().name)
    }
}

impl BuiltinKind {
    /// All built-in commands, in help order.
    pub const ALL: [BuiltinKind; 6] = [
        Self::Help,
        Self::Clear,
        Self::Plugins,
        Self::Activate,
        Self::Deactivate,
        Self::Exit,
    ];

    /// Static description of this command.
    pub fn spec(self) -> &'static BuiltinSpec {
        match self {
            Self::Help => &HELP,
            Self::Clear => &CLEAR,
            Self::Plugins => &PLUGINS,
            Self::Activate => &ACTIVATE,
            Self::Deactivate => &DEACTIVATE,
            Self::Exit => &EXIT,
        }
    }
}

/// Metadata for a built-in command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSpec {
    pub kind: BuiltinKind,
    /// The command name (without leading slash).
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Human-readable description.
    pub description: &'static str,
    /// Usage example.
    pub usage: &'static str,
    /// Suggestion priority; frequently used commands rank higher.
    pub priority: i32,
}

impl BuiltinSpec {
    /// Check if this command matches a name or alias.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Get all names for this command (primary + aliases).
    pub fn all_names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

static HELP: BuiltinSpec = BuiltinSpec {
    kind: BuiltinKind::Help,
    name: "help",
    aliases: &["h", "?"],
    description: "List available commands, or describe one",
    usage: "/help [command]",
    priority: 10,
};

static CLEAR: BuiltinSpec = BuiltinSpec {
    kind: BuiltinKind::Clear,
    name: "clear",
    aliases: &["cls"],
    description: "Clear the conversation",
    usage: "/clear",
    priority: 5,
};

static PLUGINS: BuiltinSpec = BuiltinSpec {
    kind: BuiltinKind::Plugins,
    name: "plugins",
    aliases: &["ls"],
    description: "List registered plugins and their state",
    usage: "/plugins [state]",
    priority: 3,
};

static ACTIVATE: BuiltinSpec = BuiltinSpec {
    kind: BuiltinKind::Activate,
    name: "activate",
    aliases: &[],
    description: "Activate a plugin and its dependencies",
    usage: "/activate <plugin>",
    priority: 2,
};

static DEACTIVATE: BuiltinSpec = BuiltinSpec {
    kind: BuiltinKind::Deactivate,
    name: "deactivate",
    aliases: &[],
    description: "Deactivate a plugin and everything that depends on it",
    usage: "/deactivate <plugin>",
    priority: 1,
};

static EXIT: BuiltinSpec = BuiltinSpec {
    kind: BuiltinKind::Exit,
    name: "exit",
    aliases: &["quit", "q"],
    description: "Leave the session",
    usage: "/exit",
    priority: 0,
};

/// Resolve a built-in command by name or alias (case-insensitive).
pub fn lookup(name: &str) -> Option<&'static BuiltinSpec> {
    all().find(|spec| spec.matches(name))
}

/// Every built-in spec, in help order.
pub fn all() -> impl Iterator<Item = &'static BuiltinSpec> {
    BuiltinKind::ALL.into_iter().map(BuiltinKind::spec)
}

/// Suggestion candidates for every built-in name and alias.
///
/// Single-character aliases are left out; they are within two edits of
/// almost anything.
pub fn candidates() -> Vec<Candidate<'static>> {
    all()
        .flat_map(|spec| {
            spec.all_names()
                .filter(|name| name.chars().count() > 1)
                .map(move |name| Candidate::new(name, spec.priority))
        })
        .collect()
}
