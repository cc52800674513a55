//! Switchboard CLI library.
//!
//! The binary in `main.rs` is a thin wrapper; argument parsing, logging setup,
//! the demo plugins and the session loop live here so they can be tested.

pub mod args;
pub mod demo;
pub mod logging;
pub mod session;

pub use args::{Cli, LogLevel};
pub use session::{bootstrap, run_batch, run_interactive};
