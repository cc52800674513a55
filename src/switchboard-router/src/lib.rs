//! Command routing for Switchboard.
//!
//! - [`CommandRouter`] resolves a parsed [`Command`](switchboard_commands::Command)
//!   to a plugin or a built-in handler and reports an [`ExecutionResult`]
//! - [`Orchestrator`] is the entry point for raw input, falling back to a
//!   [`FreeTextHandler`] for anything that is not a command
//! - [`AppConfig`] loads plugin and router settings from TOML

mod builtins;
pub mod config;
pub mod error;
pub mod executor;
pub mod orchestrator;

pub use config::{AppConfig, RouterConfig};
pub use error::{Result, RouterError};
pub use executor::{CommandRouter, ExecutionResult};
pub use orchestrator::{FreeTextHandler, Orchestrator, Response};
