//! Command parsing for Switchboard.
//!
//! This crate turns raw user input into structured [`Command`] values and
//! provides the pieces the router needs around them:
//!
//! - [`parse`] recognizes the `@agent:command` and `/command` dialects
//! - [`fuzzy`] ranks near-miss names for "did you mean" hints
//! - [`builtin`] describes the fixed set of slash commands
//!
//! ```rust
//! use switchboard_commands::{parse, Dialect, FlagValue};
//!
//! let cmd = parse("@git:commit --amend fix-typo").unwrap();
//! assert_eq!(cmd.dialect(), Dialect::Agent);
//! assert_eq!(cmd.agent_id(), "git");
//! assert_eq!(cmd.flag("amend"), Some(&FlagValue::Present));
//!
//! // Mentions without a command separator are free text
//! assert!(parse("@git what changed?").is_none());
//! ```

pub mod builtin;
pub mod fuzzy;
mod parser;

pub use builtin::{BuiltinKind, BuiltinSpec};
pub use fuzzy::{Candidate, DEFAULT_MAX_DISTANCE, Suggestion, find_similar, levenshtein_distance};
pub use parser::{CORE_AGENT_ID, Command, Dialect, FlagValue, format_command, parse};
