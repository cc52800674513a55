//! Two-dialect command parsing.
//!
//! Input is recognized as a command in one of two forms:
//!
//! - `@agent:command args...` addresses a command exposed by a plugin
//! - `/command args...` addresses a built-in command
//!
//! Anything else (including `@text` without a `:` separator) is free text and
//! parses to `None`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Agent id assigned to every slash command.
pub const CORE_AGENT_ID: &str = "core";

/// Flag prefix recognized in agent commands.
const FLAG_PREFIX: &str = "--";

/// The syntax a command was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `@agent:command`
    Agent,
    /// `/command`
    Slash,
}

impl Dialect {
    /// The leading character of this dialect.
    pub fn prefix(self) -> char {
        match self {
            Self::Agent => '@',
            Self::Slash => '/',
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => write!(f, "agent"),
            Self::Slash => write!(f, "slash"),
        }
    }
}

/// Value of a `--flag` argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// `--key=value`
    Value(String),
    /// Bare `--key`
    Present,
}

impl FlagValue {
    /// The string value, if one was given.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::Present => None,
        }
    }

    /// Interpret the flag as a boolean switch.
    ///
    /// A bare flag is `true`; `--key=false`, `--key=0` and `--key=no` are `false`.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Present => true,
            Self::Value(v) => !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"),
        }
    }
}

/// A parsed command. Immutable once produced by [`parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    dialect: Dialect,
    agent_id: String,
    command_name: String,
    positional_args: Vec<String>,
    flags: BTreeMap<String, FlagValue>,
    raw_input: String,
}

impl Command {
    /// The dialect the command was written in.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The leading `@` or `/`.
    pub fn prefix(&self) -> char {
        self.dialect.prefix()
    }

    /// Target agent (plugin id), or [`CORE_AGENT_ID`] for slash commands.
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn positional_args(&self) -> &[String] {
        &self.positional_args
    }

    pub fn flags(&self) -> &BTreeMap<String, FlagValue> {
        &self.flags
    }

    /// Look up a single flag.
    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// The original input, untrimmed.
    pub fn raw_input(&self) -> &str {
        &self.raw_input
    }

    /// Fully-qualified name used in diagnostics.
    ///
    /// `@git:commit` for agent commands, `/help` for slash commands.
    pub fn qualified_name(&self) -> String {
        match self.dialect {
            Dialect::Agent => format!("@{}:{}", self.agent_id, self.command_name),
            Dialect::Slash => format!("/{}", self.command_name),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}

/// Parse raw input into a [`Command`].
///
/// Returns `None` for anything that is not confidently a command. Never panics.
pub fn parse(input: &str) -> Option<Command> {
    let trimmed = input.trim();

    if let Some(rest) = trimmed.strip_prefix('@') {
        parse_agent(rest, input)
    } else if let Some(rest) = trimmed.strip_prefix('/') {
        parse_slash(rest, input)
    } else {
        None
    }
}

fn parse_agent(rest: &str, raw: &str) -> Option<Command> {
    // `@name` without a separator is a mention in free text
    let (agent, remainder) = rest.split_once(':')?;
    let agent_id = agent.trim();
    if agent_id.is_empty() {
        return None;
    }

    let mut tokens = remainder.split_whitespace();
    let command_name = tokens.next()?;
    let (positional_args, flags) = split_flags(tokens);

    Some(Command {
        dialect: Dialect::Agent,
        agent_id: agent_id.to_string(),
        command_name: command_name.to_string(),
        positional_args,
        flags,
        raw_input: raw.to_string(),
    })
}

fn parse_slash(rest: &str, raw: &str) -> Option<Command> {
    let mut tokens = rest.split_whitespace();
    let command_name = tokens.next()?;

    Some(Command {
        dialect: Dialect::Slash,
        agent_id: CORE_AGENT_ID.to_string(),
        command_name: command_name.to_string(),
        positional_args: tokens.map(str::to_string).collect(),
        flags: BTreeMap::new(),
        raw_input: raw.to_string(),
    })
}

/// Separate `--key[=value]` tokens from positional arguments.
///
/// A flag with an empty key (`--`, `--=x`) stays positional. Repeated keys keep
/// the last value.
fn split_flags<'a>(
    tokens: impl Iterator<Item = &'a str>,
) -> (Vec<String>, BTreeMap<String, FlagValue>) {
    let mut positional = Vec::new();
    let mut flags = BTreeMap::new();

    for token in tokens {
        let Some(body) = token.strip_prefix(FLAG_PREFIX) else {
            positional.push(token.to_string());
            continue;
        };

        let (key, value) = match body.split_once('=') {
            Some((key, value)) => (key, FlagValue::Value(value.to_string())),
            None => (body, FlagValue::Present),
        };

        if key.is_empty() {
            positional.push(token.to_string());
        } else {
            flags.insert(key.to_string(), value);
        }
    }

    (positional, flags)
}

/// Format a command for display.
pub fn format_command(name: &str, hints: &[&str]) -> String {
    if hints.is_empty() {
        format!("/{name}")
    } else {
        format!("/{name} {}", hints.join(" "))
    }
}
