//! Lifecycle events emitted by the plugin registry.
//!
//! The registry reports through an [`EventSink`]. Hosts pick a sink:
//! [`EventBus`] fans events out to subscribers, [`TracingEventSink`] logs
//! them, [`NoopEventSink`] drops them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::plugin::PluginState;

/// Default capacity of broadcast channels.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Named lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PluginEvent {
    /// Plugin was registered
    Registered { plugin_id: String },

    /// Plugin became active
    Activated { plugin_id: String },

    /// Plugin activation failed
    ActivationFailed { plugin_id: String, error: String },

    /// Plugin was deactivated
    Deactivated { plugin_id: String },

    /// Plugin teardown reported an error; the plugin was deactivated anyway
    DeactivationWarning { plugin_id: String, error: String },

    /// Plugin was removed from the registry
    Unregistered { plugin_id: String },
}

impl PluginEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "plugin:registered",
            Self::Activated { .. } => "plugin:activated",
            Self::ActivationFailed { .. } => "plugin:activation:failed",
            Self::Deactivated { .. } => "plugin:deactivated",
            Self::DeactivationWarning { .. } => "plugin:deactivation:warning",
            Self::Unregistered { .. } => "plugin:unregistered",
        }
    }

    /// The plugin the event is about.
    pub fn plugin_id(&self) -> &str {
        match self {
            Self::Registered { plugin_id }
            | Self::Activated { plugin_id }
            | Self::ActivationFailed { plugin_id, .. }
            | Self::Deactivated { plugin_id }
            | Self::DeactivationWarning { plugin_id, .. }
            | Self::Unregistered { plugin_id } => plugin_id,
        }
    }
}

/// A state transition for a specific plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub plugin_id: String,
    pub old_state: PluginState,
    pub new_state: PluginState,
}

/// Receiver of registry events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PluginEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: &PluginEvent) {
        (**self).emit(event);
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: &PluginEvent) {}
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &PluginEvent) {
        match event {
            PluginEvent::ActivationFailed { plugin_id, error }
            | PluginEvent::DeactivationWarning { plugin_id, error } => {
                tracing::warn!(event = event.name(), plugin = %plugin_id, "{}", error);
            }
            PluginEvent::Registered { plugin_id }
            | PluginEvent::Activated { plugin_id }
            | PluginEvent::Deactivated { plugin_id }
            | PluginEvent::Unregistered { plugin_id } => {
                tracing::info!(event = event.name(), plugin = %plugin_id, "Plugin event");
            }
        }
    }
}

/// Broadcasts events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PluginEvent>,
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create a bus retaining up to `capacity` unread events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PluginEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: &PluginEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event.clone());
    }
}

/// Drain every event currently buffered in `receiver`.
pub fn drain(receiver: &mut broadcast::Receiver<PluginEvent>) -> Vec<PluginEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Event receiver lagged, skipped {} events", skipped);
            }
            Err(_) => break,
        }
    }
    events
}
