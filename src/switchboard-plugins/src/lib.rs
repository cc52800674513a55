//! # Switchboard Plugin System
//!
//! Registry and lifecycle management for agent plugins addressed by
//! `@agent:command` invocations.
//!
//! ## Features
//!
//! - **Lifecycle**: every plugin moves through [`PluginState`], and each
//!   transition is published on a broadcast stream
//! - **Dependencies**: activating a plugin activates what it depends on first;
//!   deactivating it tears its dependents down first
//! - **Isolation**: plugin calls run under a deadline with panics caught, so a
//!   misbehaving plugin cannot take the host down
//! - **Resources**: plugins register subscriptions on their
//!   [`ActivationContext`], released when they are deactivated
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use switchboard_plugins::{PluginMetadata, PluginRegistry};
//!
//! let registry = PluginRegistry::default();
//! registry.register_plugin(Arc::new(GitPlugin), PluginMetadata::new("git", "Git"))?;
//! registry.register_plugin(
//!     Arc::new(GitUiPlugin),
//!     PluginMetadata::new("git-ui", "Git UI").depends_on("git"),
//! )?;
//!
//! // Activates git, then git-ui
//! assert!(registry.activate_plugin("git-ui").await);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod guard;
pub mod plugin;
pub mod registry;

pub use config::{PluginConfig, timeout_from_ms};
pub use context::{ActivationContext, Disposable, DisposeFailure, Subscription};
pub use error::{PluginError, Result};
pub use events::{
    EventBus, EventSink, NoopEventSink, PluginEvent, StateChange, TracingEventSink,
};
pub use guard::{PluginOperation, guarded};
pub use plugin::{
    CommandAction, CommandArgs, CommandOutput, Plugin, PluginCommandSpec, PluginMetadata,
    PluginState,
};
pub use registry::{PluginInstance, PluginRegistry};
