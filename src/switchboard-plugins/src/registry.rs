//! Plugin registry with dependency-aware lifecycle management.
//!
//! The registry owns one [`PluginInstance`] per id and drives it through the
//! [`PluginState`] machine. Dependencies are stored as ids and resolved on
//! demand, so activation walks the graph recursively (guarding against
//! cycles) and deactivation tears dependents down first.
//!
//! Activation and deactivation never return errors. Failures are recorded on
//! the instance, reported through the [`EventSink`], and surface as `false`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::config::PluginConfig;
use crate::context::ActivationContext;
use crate::events::{DEFAULT_EVENT_CAPACITY, EventSink, NoopEventSink, PluginEvent, StateChange};
use crate::guard::{PluginOperation, guarded};
use crate::plugin::{Plugin, PluginMetadata, PluginState};
use crate::{PluginError, Result};

/// Registry-internal record for a plugin.
struct PluginEntry {
    metadata: Arc<PluginMetadata>,
    implementation: Arc<dyn Plugin>,
    state: PluginState,
    error: Option<Arc<PluginError>>,
    context: Option<Arc<ActivationContext>>,
    registered_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
}

impl PluginEntry {
    fn snapshot(&self) -> PluginInstance {
        PluginInstance {
            id: self.metadata.id.clone(),
            metadata: self.metadata.clone(),
            implementation: self.implementation.clone(),
            state: self.state,
            error: self.error.clone(),
            context: self.context.clone(),
            registered_at: self.registered_at,
            activated_at: self.activated_at,
        }
    }
}

/// Point-in-time view of a registered plugin.
#[derive(Clone)]
pub struct PluginInstance {
    pub id: String,
    pub metadata: Arc<PluginMetadata>,
    pub implementation: Arc<dyn Plugin>,
    pub state: PluginState,
    /// Last activation or deactivation error
    pub error: Option<Arc<PluginError>>,
    /// Context of the current activation
    pub context: Option<Arc<ActivationContext>>,
    pub registered_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl PluginInstance {
    pub fn is_active(&self) -> bool {
        self.state == PluginState::Active
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

impl fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInstance")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("error", &self.error)
            .field("dependencies", &self.metadata.dependencies)
            .finish_non_exhaustive()
    }
}

/// Registry for plugins.
pub struct PluginRegistry {
    /// Plugins by id
    plugins: RwLock<HashMap<String, PluginEntry>>,

    config: PluginConfig,

    /// Lifecycle event sink
    events: Arc<dyn EventSink>,

    /// State transition stream
    state_changes: broadcast::Sender<StateChange>,
}

impl PluginRegistry {
    /// Create a new plugin registry.
    pub fn new(config: PluginConfig, events: Arc<dyn EventSink>) -> Self {
        let (state_changes, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            plugins: RwLock::new(HashMap::new()),
            config,
            events,
            state_changes,
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Subscribe to every state transition from now on.
    pub fn subscribe_state_changes(&self) -> broadcast::Receiver<StateChange> {
        self.state_changes.subscribe()
    }

    // ========== Registration ==========

    /// Register a plugin in the `Registered` state. Does not activate it.
    pub fn register_plugin(
        &self,
        implementation: Arc<dyn Plugin>,
        metadata: PluginMetadata,
    ) -> Result<String> {
        validate_metadata(&metadata)?;

        let id = metadata.id.clone();
        let name = metadata.name.clone();
        let version = metadata.version.clone();

        {
            let mut plugins = self.plugins.write();
            if plugins.contains_key(&id) {
                return Err(PluginError::AlreadyExists(id));
            }

            plugins.insert(
                id.clone(),
                PluginEntry {
                    metadata: Arc::new(metadata),
                    implementation,
                    state: PluginState::Registered,
                    error: None,
                    context: None,
                    registered_at: Utc::now(),
                    activated_at: None,
                },
            );
        }

        tracing::info!("Registered plugin: {} ({}) v{}", id, name, version);
        self.notify_state_change(&id, PluginState::Discovered, PluginState::Registered);
        self.events.emit(&PluginEvent::Registered {
            plugin_id: id.clone(),
        });

        Ok(id)
    }

    /// Remove a plugin, deactivating it first if it is active.
    ///
    /// Returns `false` for unknown ids, for plugins mid-transition, and when
    /// deactivation is refused.
    pub async fn unregister_plugin(&self, id: &str) -> bool {
        let Some(state) = self.state_of(id) else {
            tracing::debug!("Cannot unregister unknown plugin: {}", id);
            return false;
        };

        match state {
            PluginState::Active => {
                if !self.deactivate_plugin(id).await {
                    return false;
                }
            }
            PluginState::Activating | PluginState::Deactivating => {
                tracing::debug!("Plugin {} is {}, refusing to unregister", id, state);
                return false;
            }
            PluginState::Discovered
            | PluginState::Registered
            | PluginState::ActivationFailed
            | PluginState::Inactive => {}
        }

        if self.plugins.write().remove(id).is_none() {
            return false;
        }

        tracing::info!("Unregistered plugin: {}", id);
        self.events.emit(&PluginEvent::Unregistered {
            plugin_id: id.to_string(),
        });
        true
    }

    // ========== Activation ==========

    /// Activate a plugin and, transitively, its dependencies.
    ///
    /// Returns `true` if the plugin is active afterwards. Returns `false`
    /// immediately if the plugin is already activating.
    pub async fn activate_plugin(&self, id: &str) -> bool {
        let mut chain = Vec::new();
        self.activate_in_chain(id, &mut chain).await
    }

    /// Activate every registered plugin, in id order.
    pub async fn activate_all(&self) -> Vec<(String, bool)> {
        let mut results = Vec::new();
        for id in self.plugin_ids() {
            let activated = self.activate_plugin(&id).await;
            results.push((id, activated));
        }
        results
    }

    /// `chain` holds the ids currently being activated by this call, outermost first.
    fn activate_in_chain<'a>(
        &'a self,
        id: &'a str,
        chain: &'a mut Vec<String>,
    ) -> BoxFuture<'a, bool> {
        async move {
            let Some((state, metadata, implementation)) = self.with_entry(id, |entry| {
                (
                    entry.state,
                    entry.metadata.clone(),
                    entry.implementation.clone(),
                )
            }) else {
                tracing::warn!("Cannot activate unknown plugin: {}", id);
                return false;
            };

            match state {
                PluginState::Active => return true,
                PluginState::Activating => {
                    tracing::debug!("Plugin {} is already activating", id);
                    return false;
                }
                PluginState::Deactivating => {
                    tracing::debug!("Plugin {} is deactivating, refusing activation", id);
                    return false;
                }
                PluginState::Discovered
                | PluginState::Registered
                | PluginState::ActivationFailed
                | PluginState::Inactive => {}
            }

            if !self.config.is_plugin_enabled(id) {
                self.reject_disabled(id);
                return false;
            }

            self.transition(id, PluginState::Activating);

            chain.push(id.to_string());
            let outcome = match self.activate_dependencies(id, &metadata, chain).await {
                Ok(()) => self.invoke_activate(id, implementation.as_ref()).await,
                Err(error) => Err(error),
            };
            chain.pop();

            let context = match outcome {
                Ok(context) => context,
                Err(error) => {
                    self.fail_activation(id, error);
                    return false;
                }
            };

            match self.complete_activation(id, &metadata, &context) {
                Ok(()) => true,
                Err(error) => {
                    self.roll_back_activation(id, implementation.as_ref(), &context)
                        .await;
                    self.fail_activation(id, error);
                    false
                }
            }
        }
        .boxed()
    }

    async fn activate_dependencies(
        &self,
        id: &str,
        metadata: &PluginMetadata,
        chain: &mut Vec<String>,
    ) -> Result<()> {
        for dependency in &metadata.dependencies {
            if let Some(position) = chain.iter().position(|c| c == dependency) {
                let mut cycle = chain[position..].to_vec();
                cycle.push(dependency.clone());
                return Err(PluginError::DependencyCycle {
                    plugin: id.to_string(),
                    cycle,
                });
            }

            let Some(state) = self.state_of(dependency) else {
                return Err(PluginError::MissingDependency {
                    plugin: id.to_string(),
                    dependency: dependency.clone(),
                });
            };

            if state == PluginState::Active {
                continue;
            }

            tracing::debug!("Activating dependency {} of {}", dependency, id);
            if !self.activate_in_chain(dependency, chain).await {
                let reason = self.error_message(dependency).unwrap_or_else(|| {
                    let state = self
                        .state_of(dependency)
                        .map_or_else(|| "unregistered".to_string(), |s| s.to_string());
                    format!("dependency is {state}")
                });
                return Err(PluginError::DependencyFailed {
                    plugin: id.to_string(),
                    dependency: dependency.clone(),
                    reason,
                });
            }
        }

        Ok(())
    }

    async fn invoke_activate(
        &self,
        id: &str,
        implementation: &dyn Plugin,
    ) -> Result<Arc<ActivationContext>> {
        let context = Arc::new(ActivationContext::new(
            id,
            self.config.get_plugin_config(id).cloned(),
        ));

        let result = guarded(
            id,
            PluginOperation::Activate,
            self.config.activation_timeout(),
            implementation.activate(&context),
        )
        .await;

        match result {
            Ok(()) => Ok(context),
            Err(error) => {
                // Release whatever was acquired before the failure
                self.dispose_context(id, &context);
                Err(error)
            }
        }
    }

    /// A dependency may have gone down while `activate` was running, so the
    /// check and the transition to `Active` happen under one write lock.
    fn complete_activation(
        &self,
        id: &str,
        metadata: &PluginMetadata,
        context: &Arc<ActivationContext>,
    ) -> Result<()> {
        let old_state = {
            let mut plugins = self.plugins.write();

            let lost = metadata.dependencies.iter().find_map(|dependency| {
                match plugins.get(dependency).map(|entry| entry.state) {
                    Some(PluginState::Active) => None,
                    state => Some((dependency, state)),
                }
            });
            if let Some((dependency, state)) = lost {
                let reason = match state {
                    Some(state) => format!("dependency became {state} during activation"),
                    None => "dependency was unregistered during activation".to_string(),
                };
                return Err(PluginError::DependencyFailed {
                    plugin: id.to_string(),
                    dependency: dependency.clone(),
                    reason,
                });
            }

            let entry = plugins
                .get_mut(id)
                .ok_or_else(|| PluginError::NotFound(id.to_string()))?;
            entry.context = Some(context.clone());
            entry.error = None;
            entry.activated_at = Some(Utc::now());
            std::mem::replace(&mut entry.state, PluginState::Active)
        };

        tracing::debug!("Plugin {} state: {} -> {}", id, old_state, PluginState::Active);
        self.notify_state_change(id, old_state, PluginState::Active);

        tracing::info!("Activated plugin: {}", id);
        self.events.emit(&PluginEvent::Activated {
            plugin_id: id.to_string(),
        });
        Ok(())
    }

    /// Undo a successful `activate` whose result can no longer be kept.
    async fn roll_back_activation(
        &self,
        id: &str,
        implementation: &dyn Plugin,
        context: &ActivationContext,
    ) {
        let result = guarded(
            id,
            PluginOperation::Deactivate,
            self.config.deactivation_timeout(),
            implementation.deactivate(),
        )
        .await;
        if let Err(error) = result {
            tracing::warn!("Rolling back activation of {} failed: {}", id, error);
        }
        self.dispose_context(id, context);
    }

    fn fail_activation(&self, id: &str, error: PluginError) {
        let message = error.to_string();
        tracing::error!("Failed to activate plugin {}: {}", id, message);

        self.update(id, |entry| {
            entry.error = Some(Arc::new(error));
            entry.context = None;
            entry.activated_at = None;
        });
        self.transition(id, PluginState::ActivationFailed);

        self.events.emit(&PluginEvent::ActivationFailed {
            plugin_id: id.to_string(),
            error: message,
        });
    }

    /// Disabled plugins keep their state; only the error is recorded.
    fn reject_disabled(&self, id: &str) {
        let error = PluginError::Disabled(id.to_string());
        let message = error.to_string();
        tracing::warn!("Refusing to activate plugin {}: {}", id, message);

        self.update(id, |entry| entry.error = Some(Arc::new(error)));
        self.events.emit(&PluginEvent::ActivationFailed {
            plugin_id: id.to_string(),
            error: message,
        });
    }

    // ========== Deactivation ==========

    /// Deactivate a plugin after deactivating every active plugin that depends on it.
    ///
    /// Returns `true` if the plugin is inactive afterwards (including when it
    /// was never activated), `false` for unknown ids and plugins mid-transition.
    /// A failing `deactivate` still leaves the plugin inactive.
    pub async fn deactivate_plugin(&self, id: &str) -> bool {
        self.deactivate_cascading(id).await
    }

    /// Deactivate every active plugin. Dependents go down before their dependencies.
    pub async fn deactivate_all(&self) -> Vec<(String, bool)> {
        let mut results = Vec::new();
        for instance in self.get_active_plugins() {
            // An earlier cascade may already have taken this one down
            if !self.is_plugin_active(&instance.id) {
                continue;
            }
            let deactivated = self.deactivate_plugin(&instance.id).await;
            results.push((instance.id, deactivated));
        }
        results
    }

    fn deactivate_cascading<'a>(&'a self, id: &'a str) -> BoxFuture<'a, bool> {
        async move {
            let Some(state) = self.state_of(id) else {
                tracing::warn!("Cannot deactivate unknown plugin: {}", id);
                return false;
            };

            match state {
                PluginState::Discovered
                | PluginState::Registered
                | PluginState::ActivationFailed
                | PluginState::Inactive => return true,
                PluginState::Deactivating => {
                    tracing::debug!("Plugin {} is already deactivating", id);
                    return false;
                }
                PluginState::Activating => {
                    tracing::debug!("Plugin {} is activating, refusing deactivation", id);
                    return false;
                }
                PluginState::Active => {}
            }

            let (implementation, context) = loop {
                for dependent in self.active_dependents(id) {
                    tracing::debug!("Deactivating {} before its dependency {}", dependent, id);
                    if !self.deactivate_cascading(&dependent).await {
                        tracing::warn!(
                            "Dependent {} of {} did not deactivate cleanly",
                            dependent,
                            id
                        );
                    }
                }

                match self.begin_deactivation(id) {
                    Teardown::Ready(implementation, context) => break (implementation, context),
                    Teardown::DependentsActive => continue,
                    Teardown::Unavailable => {
                        tracing::debug!("Plugin {} changed state during its cascade", id);
                        return false;
                    }
                }
            };

            let result = guarded(
                id,
                PluginOperation::Deactivate,
                self.config.deactivation_timeout(),
                implementation.deactivate(),
            )
            .await;

            if let Some(context) = context {
                self.dispose_context(id, &context);
            }

            let warning = result.as_ref().err().map(ToString::to_string);
            let error = result.err().map(Arc::new);
            self.update(id, |entry| {
                entry.context = None;
                entry.activated_at = None;
                entry.error = error;
            });
            self.transition(id, PluginState::Inactive);

            if let Some(message) = warning {
                tracing::warn!("Plugin {} deactivated with errors: {}", id, message);
                self.events.emit(&PluginEvent::DeactivationWarning {
                    plugin_id: id.to_string(),
                    error: message,
                });
            }

            tracing::info!("Deactivated plugin: {}", id);
            self.events.emit(&PluginEvent::Deactivated {
                plugin_id: id.to_string(),
            });
            true
        }
        .boxed()
    }

    /// Moves an `Active` plugin to `Deactivating` unless one of its dependents
    /// became active after the cascade ran.
    fn begin_deactivation(&self, id: &str) -> Teardown {
        let (implementation, context) = {
            let mut plugins = self.plugins.write();

            if plugins.values().any(|entry| {
                entry.state == PluginState::Active && entry.metadata.depends_on_plugin(id)
            }) {
                return Teardown::DependentsActive;
            }

            let Some(entry) = plugins.get_mut(id) else {
                return Teardown::Unavailable;
            };
            if entry.state != PluginState::Active {
                return Teardown::Unavailable;
            }
            entry.state = PluginState::Deactivating;
            (entry.implementation.clone(), entry.context.clone())
        };

        tracing::debug!(
            "Plugin {} state: {} -> {}",
            id,
            PluginState::Active,
            PluginState::Deactivating
        );
        self.notify_state_change(id, PluginState::Active, PluginState::Deactivating);
        Teardown::Ready(implementation, context)
    }

    fn dispose_context(&self, id: &str, context: &ActivationContext) {
        for failure in context.dispose_all() {
            tracing::warn!(
                plugin = id,
                "Failed to dispose subscription '{}': {}",
                failure.label,
                failure.error
            );
        }
    }

    // ========== Queries ==========

    /// Check if a plugin is active.
    pub fn is_plugin_active(&self, id: &str) -> bool {
        self.state_of(id) == Some(PluginState::Active)
    }

    /// Get a plugin by id.
    pub fn get_plugin(&self, id: &str) -> Option<PluginInstance> {
        self.with_entry(id, PluginEntry::snapshot)
    }

    /// All plugins, sorted by id.
    pub fn get_all_plugins(&self) -> Vec<PluginInstance> {
        self.collect(|_| true)
    }

    /// Plugins currently in `state`, sorted by id.
    pub fn get_plugins_by_state(&self, state: PluginState) -> Vec<PluginInstance> {
        self.collect(|entry| entry.state == state)
    }

    /// Active plugins, sorted by id.
    pub fn get_active_plugins(&self) -> Vec<PluginInstance> {
        self.get_plugins_by_state(PluginState::Active)
    }

    /// Current state of a plugin.
    pub fn state_of(&self, id: &str) -> Option<PluginState> {
        self.with_entry(id, |entry| entry.state)
    }

    /// Last recorded error of a plugin.
    pub fn error_message(&self, id: &str) -> Option<String> {
        self.with_entry(id, |entry| entry.error.as_ref().map(|e| e.to_string()))
            .flatten()
    }

    /// Registered ids, sorted.
    pub fn plugin_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.plugins.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if a plugin is registered.
    pub fn is_registered(&self, id: &str) -> bool {
        self.plugins.read().contains_key(id)
    }

    /// Get plugin count.
    pub fn count(&self) -> usize {
        self.plugins.read().len()
    }

    /// Ids of every registered plugin that declares `id` as a dependency.
    pub fn dependents_of(&self, id: &str) -> Vec<String> {
        self.collect_ids(|entry| entry.metadata.depends_on_plugin(id))
    }

    fn active_dependents(&self, id: &str) -> Vec<String> {
        self.collect_ids(|entry| {
            entry.state == PluginState::Active && entry.metadata.depends_on_plugin(id)
        })
    }

    // ========== Internals ==========

    fn with_entry<T>(&self, id: &str, f: impl FnOnce(&PluginEntry) -> T) -> Option<T> {
        self.plugins.read().get(id).map(f)
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut PluginEntry)) {
        if let Some(entry) = self.plugins.write().get_mut(id) {
            f(entry);
        }
    }

    fn collect(&self, filter: impl Fn(&PluginEntry) -> bool) -> Vec<PluginInstance> {
        let mut instances: Vec<PluginInstance> = self
            .plugins
            .read()
            .values()
            .filter(|entry| filter(entry))
            .map(PluginEntry::snapshot)
            .collect();
        instances.sort_by(|a, b| a.id.cmp(&b.id));
        instances
    }

    fn collect_ids(&self, filter: impl Fn(&PluginEntry) -> bool) -> Vec<String> {
        let mut ids: Vec<String> = self
            .plugins
            .read()
            .iter()
            .filter(|(_, entry)| filter(entry))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    fn transition(&self, id: &str, new_state: PluginState) -> Option<PluginState> {
        let old_state = {
            let mut plugins = self.plugins.write();
            let entry = plugins.get_mut(id)?;
            std::mem::replace(&mut entry.state, new_state)
        };

        tracing::debug!("Plugin {} state: {} -> {}", id, old_state, new_state);
        self.notify_state_change(id, old_state, new_state);
        Some(old_state)
    }

    fn notify_state_change(&self, id: &str, old_state: PluginState, new_state: PluginState) {
        // No subscribers is not an error
        let _ = self.state_changes.send(StateChange {
            plugin_id: id.to_string(),
            old_state,
            new_state,
        });
    }
}

enum Teardown {
    Ready(Arc<dyn Plugin>, Option<Arc<ActivationContext>>),
    DependentsActive,
    Unavailable,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new(PluginConfig::default(), Arc::new(NoopEventSink))
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugin_ids())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Ids must be addressable as `@id:command`.
fn validate_metadata(metadata: &PluginMetadata) -> Result<()> {
    let id = &metadata.id;

    if id.is_empty() {
        return Err(PluginError::invalid_metadata(id, "plugin id is empty"));
    }
    if id.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(PluginError::invalid_metadata(
            id,
            "plugin id must not contain whitespace or ':'",
        ));
    }
    if id.starts_with(['@', '/']) {
        return Err(PluginError::invalid_metadata(
            id,
            "plugin id must not start with '@' or '/'",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{CommandArgs, CommandOutput};

    struct MockPlugin;

    #[async_trait::async_trait]
    impl Plugin for MockPlugin {
        async fn activate(&self, _ctx: &ActivationContext) -> Result<()> {
            Ok(())
        }

        async fn execute_command(&self, name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
            Ok(CommandOutput::text(format!("Mock command: {}", name)))
        }
    }

    fn register(registry: &PluginRegistry, id: &str) -> Result<String> {
        registry.register_plugin(Arc::new(MockPlugin), PluginMetadata::new(id, id))
    }

    #[test]
    fn test_register_plugin() {
        let registry = PluginRegistry::default();
        assert_eq!(register(&registry, "test").unwrap(), "test");

        let instance = registry.get_plugin("test").unwrap();
        assert_eq!(instance.state, PluginState::Registered);
        assert!(instance.error.is_none());
        assert!(registry.is_registered("test"));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_register_duplicate() {
        let registry = PluginRegistry::default();
        register(&registry, "test").unwrap();

        let result = register(&registry, "test");
        assert!(matches!(result, Err(PluginError::AlreadyExists(id)) if id == "test"));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_register_rejects_unaddressable_ids() {
        let registry = PluginRegistry::default();
        for id in ["", "has space", "a:b", "@git", "/git"] {
            assert!(
                matches!(register(&registry, id), Err(PluginError::InvalidMetadata { .. })),
                "{id:?} should be rejected"
            );
        }
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_queries_are_sorted() {
        let registry = PluginRegistry::default();
        for id in ["zeta", "alpha", "mid"] {
            register(&registry, id).unwrap();
        }

        let ids: Vec<String> = registry
            .get_all_plugins()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.plugin_ids(), ids);
        assert_eq!(
            registry.get_plugins_by_state(PluginState::Registered).len(),
            3
        );
        assert!(registry.get_active_plugins().is_empty());
    }

    #[tokio::test]
    async fn test_activate_and_deactivate() {
        let registry = PluginRegistry::default();
        register(&registry, "test").unwrap();

        assert!(registry.activate_plugin("test").await);
        assert!(registry.is_plugin_active("test"));
        assert!(registry.get_plugin("test").unwrap().activated_at.is_some());

        assert!(registry.deactivate_plugin("test").await);
        let instance = registry.get_plugin("test").unwrap();
        assert_eq!(instance.state, PluginState::Inactive);
        assert!(instance.context.is_none());
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let registry = PluginRegistry::default();
        assert!(!registry.activate_plugin("ghost").await);
        assert!(!registry.deactivate_plugin("ghost").await);
        assert!(!registry.unregister_plugin("ghost").await);
        assert!(registry.get_plugin("ghost").is_none());
    }

    #[tokio::test]
    async fn test_dependents_of() {
        let registry = PluginRegistry::default();
        register(&registry, "git").unwrap();
        registry
            .register_plugin(
                Arc::new(MockPlugin),
                PluginMetadata::new("git-ui", "Git UI").depends_on("git"),
            )
            .unwrap();

        assert_eq!(registry.dependents_of("git"), vec!["git-ui"]);
        assert!(registry.dependents_of("git-ui").is_empty());
    }
}
