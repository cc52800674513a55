//! Per-activation context handed to plugins.
//!
//! A fresh [`ActivationContext`] is created for every activation. Plugins
//! register the resources they acquire as subscriptions; the registry disposes
//! all of them when the plugin is deactivated, or right away if activation
//! fails.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::guard::panic_message;
use crate::{PluginError, Result};

/// A resource released when its plugin is deactivated.
pub trait Disposable: Send {
    fn dispose(self: Box<Self>) -> Result<()>;
}

impl<F> Disposable for F
where
    F: FnOnce() -> Result<()> + Send,
{
    fn dispose(self: Box<Self>) -> Result<()> {
        (*self)()
    }
}

/// A labelled disposable held by an [`ActivationContext`].
pub struct Subscription {
    label: String,
    resource: Box<dyn Disposable>,
}

impl Subscription {
    pub fn new(label: impl Into<String>, resource: impl Disposable + 'static) -> Self {
        Self {
            label: label.into(),
            resource: Box::new(resource),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A subscription whose disposal failed.
#[derive(Debug)]
pub struct DisposeFailure {
    pub label: String,
    pub error: PluginError,
}

/// Context for a single activation of a plugin.
pub struct ActivationContext {
    plugin_id: String,
    activation_id: Uuid,
    config: Option<serde_json::Value>,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl ActivationContext {
    /// Create a context for `plugin_id` with its plugin-specific config.
    pub fn new(plugin_id: impl Into<String>, config: Option<serde_json::Value>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            activation_id: Uuid::new_v4(),
            config,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Unique id of this activation.
    pub fn activation_id(&self) -> Uuid {
        self.activation_id
    }

    /// Raw plugin-specific configuration.
    pub fn config(&self) -> Option<&serde_json::Value> {
        self.config.as_ref()
    }

    /// Deserialize the plugin-specific configuration.
    pub fn config_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.config
            .as_ref()
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(|e| {
                PluginError::ConfigError(format!("invalid config for '{}': {e}", self.plugin_id))
            })
    }

    /// Hold a subscription until deactivation.
    pub fn subscribe(&self, subscription: Subscription) {
        tracing::trace!(
            plugin = %self.plugin_id,
            "Added subscription: {}",
            subscription.label
        );
        self.subscriptions.lock().push(subscription);
    }

    /// Run `dispose` on deactivation.
    pub fn on_dispose<F>(&self, label: impl Into<String>, dispose: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.subscribe(Subscription::new(label, dispose));
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Dispose every subscription, most recent first.
    ///
    /// Each disposal is isolated: an error or panic is collected and the
    /// remaining subscriptions are still disposed.
    pub fn dispose_all(&self) -> Vec<DisposeFailure> {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        let mut failures = Vec::new();

        for Subscription { label, resource } in subscriptions.into_iter().rev() {
            let outcome = catch_unwind(AssertUnwindSafe(|| resource.dispose()))
                .unwrap_or_else(|payload| {
                    Err(PluginError::deactivation_error(
                        &self.plugin_id,
                        format!("disposal panicked: {}", panic_message(payload.as_ref())),
                    ))
                });

            if let Err(error) = outcome {
                failures.push(DisposeFailure { label, error });
            }
        }

        failures
    }
}

impl fmt::Debug for ActivationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationContext")
            .field("plugin_id", &self.plugin_id)
            .field("activation_id", &self.activation_id)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}
