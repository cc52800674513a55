//! Integration tests for the plugin lifecycle: register → activate → deactivate → unregister.
//!
//! Covers:
//! - Dependency-ordered activation and cascading deactivation
//! - Failure recording (missing dependencies, cycles, timeouts, panics)
//! - Idempotence and re-entrancy guards
//! - Event and state-change emission

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::sync::{Notify, broadcast};

use switchboard_plugins::events::drain;
use switchboard_plugins::{
    ActivationContext, CommandArgs, CommandOutput, EventBus, Plugin, PluginConfig, PluginError,
    PluginEvent, PluginMetadata, PluginRegistry, PluginState, Result, StateChange,
};

// =============================================================================
// Mock Plugins
// =============================================================================

type Journal = Arc<Mutex<Vec<String>>>;

/// Records every lifecycle call into a shared journal.
struct RecordingPlugin {
    id: String,
    journal: Journal,
    fail_activate: AtomicBool,
    fail_deactivate: bool,
}

impl RecordingPlugin {
    fn new(id: &str, journal: &Journal) -> Self {
        Self {
            id: id.to_string(),
            journal: journal.clone(),
            fail_activate: AtomicBool::new(false),
            fail_deactivate: false,
        }
    }

    fn failing(self) -> Self {
        self.fail_activate.store(true, Ordering::SeqCst);
        self
    }

    fn failing_teardown(mut self) -> Self {
        self.fail_deactivate = true;
        self
    }
}

#[async_trait]
impl Plugin for RecordingPlugin {
    async fn activate(&self, ctx: &ActivationContext) -> Result<()> {
        self.journal.lock().push(format!("activate:{}", self.id));

        let journal = self.journal.clone();
        let id = self.id.clone();
        ctx.on_dispose("journal", move || {
            journal.lock().push(format!("dispose:{id}"));
            Ok(())
        });

        if self.fail_activate.load(Ordering::SeqCst) {
            return Err(PluginError::activation_error(&self.id, "backend unreachable"));
        }
        Ok(())
    }

    async fn deactivate(&self) -> Result<()> {
        self.journal.lock().push(format!("deactivate:{}", self.id));
        if self.fail_deactivate {
            return Err(PluginError::deactivation_error(&self.id, "flush failed"));
        }
        Ok(())
    }

    async fn execute_command(&self, name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
        Ok(CommandOutput::text(format!("{}:{}", self.id, name)))
    }
}

/// Never finishes activating.
struct SlowPlugin;

#[async_trait]
impl Plugin for SlowPlugin {
    async fn activate(&self, _ctx: &ActivationContext) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn execute_command(&self, _name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
        Ok(CommandOutput::empty())
    }
}

fn explode() -> Result<()> {
    panic!("activation blew up")
}

/// Panics while activating.
struct PanickingPlugin;

#[async_trait]
impl Plugin for PanickingPlugin {
    async fn activate(&self, _ctx: &ActivationContext) -> Result<()> {
        explode()
    }

    async fn execute_command(&self, _name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
        Ok(CommandOutput::empty())
    }
}

/// Blocks in `activate` until released, then records like [`RecordingPlugin`].
struct GatedPlugin {
    id: String,
    release: Arc<Notify>,
    journal: Journal,
}

impl GatedPlugin {
    fn new(id: &str, release: &Arc<Notify>, journal: &Journal) -> Self {
        Self {
            id: id.to_string(),
            release: release.clone(),
            journal: journal.clone(),
        }
    }
}

#[async_trait]
impl Plugin for GatedPlugin {
    async fn activate(&self, ctx: &ActivationContext) -> Result<()> {
        self.release.notified().await;
        self.journal.lock().push(format!("activate:{}", self.id));

        let journal = self.journal.clone();
        let id = self.id.clone();
        ctx.on_dispose("journal", move || {
            journal.lock().push(format!("dispose:{id}"));
            Ok(())
        });
        Ok(())
    }

    async fn deactivate(&self) -> Result<()> {
        self.journal.lock().push(format!("deactivate:{}", self.id));
        Ok(())
    }

    async fn execute_command(&self, _name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
        Ok(CommandOutput::empty())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn registry_with_bus(config: PluginConfig) -> (PluginRegistry, broadcast::Receiver<PluginEvent>) {
    let bus = Arc::new(EventBus::new());
    let events = bus.subscribe();
    (PluginRegistry::new(config, bus), events)
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

fn register(registry: &PluginRegistry, plugin: impl Plugin + 'static, metadata: PluginMetadata) {
    registry.register_plugin(Arc::new(plugin), metadata).unwrap();
}

fn summarize(events: &[PluginEvent]) -> Vec<(&'static str, String)> {
    events
        .iter()
        .map(|e| (e.name(), e.plugin_id().to_string()))
        .collect()
}

fn pair(name: &'static str, id: &str) -> (&'static str, String) {
    (name, id.to_string())
}

fn state(registry: &PluginRegistry, id: &str) -> PluginState {
    registry.get_plugin(id).unwrap().state
}

fn drain_changes(rx: &mut broadcast::Receiver<StateChange>) -> Vec<StateChange> {
    let mut changes = Vec::new();
    while let Ok(change) = rx.try_recv() {
        changes.push(change);
    }
    changes
}

// =============================================================================
// Registration and activation
// =============================================================================

#[tokio::test]
async fn test_register_does_not_activate() {
    let (registry, mut events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(&registry, RecordingPlugin::new("git", &log), PluginMetadata::new("git", "Git"));

    assert_eq!(state(&registry, "git"), PluginState::Registered);
    assert!(log.lock().is_empty());
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![pair("plugin:registered", "git")]
    );
}

#[tokio::test]
async fn test_activate_is_idempotent() {
    let (registry, mut events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(&registry, RecordingPlugin::new("git", &log), PluginMetadata::new("git", "Git"));
    drain(&mut events);

    assert!(registry.activate_plugin("git").await);
    assert!(registry.activate_plugin("git").await);

    assert_eq!(*log.lock(), vec!["activate:git"]);
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![pair("plugin:activated", "git")]
    );
}

#[tokio::test]
async fn test_dependency_activates_first() {
    let (registry, mut events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(&registry, RecordingPlugin::new("git", &log), PluginMetadata::new("git", "Git"));
    register(
        &registry,
        RecordingPlugin::new("git-ui", &log),
        PluginMetadata::new("git-ui", "Git UI").depends_on("git"),
    );
    drain(&mut events);

    assert!(registry.activate_plugin("git-ui").await);

    assert!(registry.is_plugin_active("git"));
    assert!(registry.is_plugin_active("git-ui"));
    assert_eq!(*log.lock(), vec!["activate:git", "activate:git-ui"]);
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![
            pair("plugin:activated", "git"),
            pair("plugin:activated", "git-ui")
        ]
    );
}

#[tokio::test]
async fn test_failed_dependency_blocks_dependent() {
    let (registry, _events) = registry_with_bus(PluginConfig::default());
    let mut changes = registry.subscribe_state_changes();
    let log = journal();
    register(
        &registry,
        RecordingPlugin::new("a", &log).failing(),
        PluginMetadata::new("a", "A"),
    );
    register(
        &registry,
        RecordingPlugin::new("b", &log),
        PluginMetadata::new("b", "B").depends_on("a"),
    );

    assert!(!registry.activate_plugin("b").await);

    assert_eq!(state(&registry, "a"), PluginState::ActivationFailed);
    assert_eq!(state(&registry, "b"), PluginState::ActivationFailed);

    let b = registry.get_plugin("b").unwrap();
    match b.error.as_deref() {
        Some(PluginError::DependencyFailed {
            dependency, reason, ..
        }) => {
            assert_eq!(dependency, "a");
            assert!(reason.contains("backend unreachable"));
        }
        other => panic!("expected DependencyFailed, got {other:?}"),
    }

    // b's own activate was never invoked and b never became active
    assert_eq!(*log.lock(), vec!["activate:a", "dispose:a"]);
    assert!(
        !drain_changes(&mut changes)
            .iter()
            .any(|c| c.plugin_id == "b" && c.new_state == PluginState::Active)
    );
}

#[tokio::test]
async fn test_missing_dependency_is_named() {
    let (registry, _events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(
        &registry,
        RecordingPlugin::new("git-ui", &log),
        PluginMetadata::new("git-ui", "Git UI").depends_on("git"),
    );

    assert!(!registry.activate_plugin("git-ui").await);

    let instance = registry.get_plugin("git-ui").unwrap();
    assert_eq!(instance.state, PluginState::ActivationFailed);
    assert!(matches!(
        instance.error.as_deref(),
        Some(PluginError::MissingDependency { dependency, .. }) if dependency == "git"
    ));
    assert!(instance.error_message().unwrap().contains("'git'"));
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn test_dependency_cycle_fails_fast() {
    let (registry, _events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(
        &registry,
        RecordingPlugin::new("a", &log),
        PluginMetadata::new("a", "A").depends_on("b"),
    );
    register(
        &registry,
        RecordingPlugin::new("b", &log),
        PluginMetadata::new("b", "B").depends_on("a"),
    );

    assert!(!registry.activate_plugin("a").await);

    let b = registry.get_plugin("b").unwrap();
    match b.error.as_deref() {
        Some(PluginError::DependencyCycle { cycle, .. }) => {
            assert_eq!(cycle, &vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        }
        other => panic!("expected DependencyCycle, got {other:?}"),
    }
    assert!(matches!(
        registry.get_plugin("a").unwrap().error.as_deref(),
        Some(PluginError::DependencyFailed { .. })
    ));
    assert!(registry.get_active_plugins().is_empty());
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn test_self_dependency_is_a_cycle() {
    let registry = PluginRegistry::default();
    let log = journal();
    register(
        &registry,
        RecordingPlugin::new("loop", &log),
        PluginMetadata::new("loop", "Loop").depends_on("loop"),
    );

    assert!(!registry.activate_plugin("loop").await);
    assert!(matches!(
        registry.get_plugin("loop").unwrap().error.as_deref(),
        Some(PluginError::DependencyCycle { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_activation_timeout_is_recorded() {
    let config = PluginConfig {
        activation_timeout_ms: 50,
        ..Default::default()
    };
    let (registry, mut events) = registry_with_bus(config);
    register(&registry, SlowPlugin, PluginMetadata::new("slow", "Slow"));
    drain(&mut events);

    assert!(!registry.activate_plugin("slow").await);

    let instance = registry.get_plugin("slow").unwrap();
    assert_eq!(instance.state, PluginState::ActivationFailed);
    assert!(instance.error.as_deref().is_some_and(PluginError::is_timeout));
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![pair("plugin:activation:failed", "slow")]
    );
}

#[tokio::test]
async fn test_panicking_plugin_is_isolated() {
    let registry = PluginRegistry::default();
    let log = journal();
    register(&registry, PanickingPlugin, PluginMetadata::new("bad", "Bad"));
    register(&registry, RecordingPlugin::new("good", &log), PluginMetadata::new("good", "Good"));

    assert!(!registry.activate_plugin("bad").await);
    match registry.get_plugin("bad").unwrap().error.as_deref() {
        Some(PluginError::Panicked { message, .. }) => {
            assert_eq!(message, "activation blew up");
        }
        other => panic!("expected Panicked, got {other:?}"),
    }

    // The registry keeps working after a plugin panic
    assert!(registry.activate_plugin("good").await);
}

#[tokio::test]
async fn test_failed_activation_can_be_retried() {
    let registry = PluginRegistry::default();
    let log = journal();
    let plugin = Arc::new(RecordingPlugin::new("flaky", &log).failing());
    registry
        .register_plugin(plugin.clone(), PluginMetadata::new("flaky", "Flaky"))
        .unwrap();

    assert!(!registry.activate_plugin("flaky").await);
    assert_eq!(state(&registry, "flaky"), PluginState::ActivationFailed);

    plugin.fail_activate.store(false, Ordering::SeqCst);
    assert!(registry.activate_plugin("flaky").await);

    let instance = registry.get_plugin("flaky").unwrap();
    assert!(instance.is_active());
    assert!(instance.error.is_none());
}

#[tokio::test]
async fn test_disabled_plugin_keeps_state() {
    let mut config = PluginConfig::default();
    config.disable_plugin("jira");
    let (registry, mut events) = registry_with_bus(config);
    let log = journal();
    register(&registry, RecordingPlugin::new("jira", &log), PluginMetadata::new("jira", "Jira"));
    drain(&mut events);

    assert!(!registry.activate_plugin("jira").await);

    let instance = registry.get_plugin("jira").unwrap();
    assert_eq!(instance.state, PluginState::Registered);
    assert!(matches!(instance.error.as_deref(), Some(PluginError::Disabled(_))));
    assert!(log.lock().is_empty());
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![pair("plugin:activation:failed", "jira")]
    );
}

#[tokio::test]
async fn test_plugin_config_reaches_context() {
    struct ConfigProbe {
        seen: Arc<Mutex<Option<serde_json::Value>>>,
    }

    #[async_trait]
    impl Plugin for ConfigProbe {
        async fn activate(&self, ctx: &ActivationContext) -> Result<()> {
            *self.seen.lock() = ctx.config().cloned();
            Ok(())
        }

        async fn execute_command(&self, _name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
            Ok(CommandOutput::empty())
        }
    }

    let mut config = PluginConfig::default();
    config.set_plugin_config("notes", serde_json::json!({ "limit": 3 }));
    let registry = PluginRegistry::new(config, Arc::new(EventBus::new()));
    let seen = Arc::new(Mutex::new(None));
    register(
        &registry,
        ConfigProbe { seen: seen.clone() },
        PluginMetadata::new("notes", "Notes"),
    );

    assert!(registry.activate_plugin("notes").await);
    assert_eq!(*seen.lock(), Some(serde_json::json!({ "limit": 3 })));
}

#[tokio::test]
async fn test_reentrant_calls_are_refused_while_activating() {
    let registry = Arc::new(PluginRegistry::default());
    let release = Arc::new(Notify::new());
    register(
        &registry,
        GatedPlugin::new("gate", &release, &journal()),
        PluginMetadata::new("gate", "Gate"),
    );

    let task = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.activate_plugin("gate").await })
    };

    while registry.state_of("gate") != Some(PluginState::Activating) {
        tokio::task::yield_now().await;
    }

    assert!(!registry.activate_plugin("gate").await);
    assert!(!registry.deactivate_plugin("gate").await);
    assert!(!registry.unregister_plugin("gate").await);

    release.notify_one();
    assert!(task.await.unwrap());
    assert!(registry.is_plugin_active("gate"));
}

/// `a` is active and `b` (depending on `a`) is parked inside `activate`.
async fn dependent_mid_activation(
    registry: &Arc<PluginRegistry>,
    release: &Arc<Notify>,
    log: &Journal,
) -> tokio::task::JoinHandle<bool> {
    register(registry, RecordingPlugin::new("a", log), PluginMetadata::new("a", "A"));
    register(
        registry,
        GatedPlugin::new("b", release, log),
        PluginMetadata::new("b", "B").depends_on("a"),
    );
    assert!(registry.activate_plugin("a").await);

    let task = {
        let registry = registry.clone();
        tokio::spawn(async move { registry.activate_plugin("b").await })
    };
    while registry.state_of("b") != Some(PluginState::Activating) {
        tokio::task::yield_now().await;
    }
    task
}

#[tokio::test]
async fn test_dependency_deactivated_during_activation_fails_dependent() {
    let registry = Arc::new(PluginRegistry::default());
    let release = Arc::new(Notify::new());
    let log = journal();
    let task = dependent_mid_activation(&registry, &release, &log).await;

    assert!(registry.deactivate_plugin("a").await);
    assert_eq!(state(&registry, "a"), PluginState::Inactive);

    release.notify_one();
    assert!(!task.await.unwrap());

    let b = registry.get_plugin("b").unwrap();
    assert_eq!(b.state, PluginState::ActivationFailed);
    assert!(matches!(
        b.error.as_deref(),
        Some(PluginError::DependencyFailed { dependency, .. }) if dependency == "a"
    ));
    assert!(registry.get_active_plugins().is_empty());
    // The late activation is torn down again
    assert_eq!(
        *log.lock(),
        vec![
            "activate:a",
            "deactivate:a",
            "dispose:a",
            "activate:b",
            "deactivate:b",
            "dispose:b"
        ]
    );
}

#[tokio::test]
async fn test_dependency_unregistered_during_activation_fails_dependent() {
    let registry = Arc::new(PluginRegistry::default());
    let release = Arc::new(Notify::new());
    let log = journal();
    let task = dependent_mid_activation(&registry, &release, &log).await;

    assert!(registry.unregister_plugin("a").await);

    release.notify_one();
    assert!(!task.await.unwrap());

    assert_eq!(state(&registry, "b"), PluginState::ActivationFailed);
    assert!(
        registry
            .error_message("b")
            .unwrap()
            .contains("unregistered during activation")
    );
    assert!(!registry.is_plugin_active("b"));
}

#[tokio::test]
async fn test_dependent_can_activate_after_dependency_returns() {
    let registry = Arc::new(PluginRegistry::default());
    let release = Arc::new(Notify::new());
    let log = journal();
    let task = dependent_mid_activation(&registry, &release, &log).await;

    assert!(registry.deactivate_plugin("a").await);
    release.notify_one();
    assert!(!task.await.unwrap());

    // A retry re-activates the dependency first
    release.notify_one();
    assert!(registry.activate_plugin("b").await);
    assert!(registry.is_plugin_active("a"));
    assert!(registry.is_plugin_active("b"));
}

// =============================================================================
// Deactivation and unregistration
// =============================================================================

#[tokio::test]
async fn test_deactivation_cascades_to_dependents_first() {
    let (registry, mut events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(&registry, RecordingPlugin::new("a", &log), PluginMetadata::new("a", "A"));
    register(
        &registry,
        RecordingPlugin::new("b", &log),
        PluginMetadata::new("b", "B").depends_on("a"),
    );
    assert!(registry.activate_plugin("b").await);
    log.lock().clear();
    drain(&mut events);

    assert!(registry.deactivate_plugin("a").await);

    assert_eq!(state(&registry, "a"), PluginState::Inactive);
    assert_eq!(state(&registry, "b"), PluginState::Inactive);
    assert_eq!(
        *log.lock(),
        vec!["deactivate:b", "dispose:b", "deactivate:a", "dispose:a"]
    );
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![pair("plugin:deactivated", "b"), pair("plugin:deactivated", "a")]
    );
}

#[tokio::test]
async fn test_deactivate_dormant_plugin_is_noop() {
    let (registry, mut events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(&registry, RecordingPlugin::new("fresh", &log), PluginMetadata::new("fresh", "Fresh"));
    register(
        &registry,
        RecordingPlugin::new("broken", &log).failing(),
        PluginMetadata::new("broken", "Broken"),
    );
    assert!(!registry.activate_plugin("broken").await);
    log.lock().clear();
    drain(&mut events);

    assert!(registry.deactivate_plugin("fresh").await);
    assert!(registry.deactivate_plugin("broken").await);

    assert_eq!(state(&registry, "fresh"), PluginState::Registered);
    assert_eq!(state(&registry, "broken"), PluginState::ActivationFailed);
    assert!(log.lock().is_empty());
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn test_failed_teardown_still_deactivates() {
    let (registry, mut events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(
        &registry,
        RecordingPlugin::new("db", &log).failing_teardown(),
        PluginMetadata::new("db", "Database"),
    );
    assert!(registry.activate_plugin("db").await);
    drain(&mut events);

    assert!(registry.deactivate_plugin("db").await);

    let instance = registry.get_plugin("db").unwrap();
    assert_eq!(instance.state, PluginState::Inactive);
    assert!(instance.context.is_none());
    assert!(matches!(
        instance.error.as_deref(),
        Some(PluginError::DeactivationError { .. })
    ));
    // Subscriptions are released even when deactivate fails
    assert!(log.lock().contains(&"dispose:db".to_string()));
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![
            pair("plugin:deactivation:warning", "db"),
            pair("plugin:deactivated", "db")
        ]
    );
}

#[tokio::test]
async fn test_failing_disposal_does_not_block_others() {
    struct LeakyPlugin {
        disposed: Journal,
    }

    #[async_trait]
    impl Plugin for LeakyPlugin {
        async fn activate(&self, ctx: &ActivationContext) -> Result<()> {
            let disposed = self.disposed.clone();
            ctx.on_dispose("watcher", move || {
                disposed.lock().push("watcher".to_string());
                Ok(())
            });
            ctx.on_dispose("socket", || {
                Err(PluginError::deactivation_error("leaky", "socket already closed"))
            });
            let disposed = self.disposed.clone();
            ctx.on_dispose("timer", move || {
                disposed.lock().push("timer".to_string());
                Ok(())
            });
            Ok(())
        }

        async fn execute_command(&self, _name: &str, _args: &CommandArgs) -> Result<CommandOutput> {
            Ok(CommandOutput::empty())
        }
    }

    let registry = PluginRegistry::default();
    let disposed = journal();
    register(
        &registry,
        LeakyPlugin {
            disposed: disposed.clone(),
        },
        PluginMetadata::new("leaky", "Leaky"),
    );

    assert!(registry.activate_plugin("leaky").await);
    assert_eq!(
        registry
            .get_plugin("leaky")
            .unwrap()
            .context
            .unwrap()
            .subscription_count(),
        3
    );

    assert!(registry.deactivate_plugin("leaky").await);
    assert_eq!(*disposed.lock(), vec!["timer", "watcher"]);
    assert!(registry.get_plugin("leaky").unwrap().error.is_none());
}

#[tokio::test]
async fn test_unregister_active_plugin() {
    let (registry, mut events) = registry_with_bus(PluginConfig::default());
    let log = journal();
    register(&registry, RecordingPlugin::new("git", &log), PluginMetadata::new("git", "Git"));
    assert!(registry.activate_plugin("git").await);
    drain(&mut events);

    assert!(registry.unregister_plugin("git").await);

    assert!(registry.get_plugin("git").is_none());
    assert_eq!(registry.count(), 0);
    assert_eq!(*log.lock(), vec!["activate:git", "deactivate:git", "dispose:git"]);
    assert_eq!(
        summarize(&drain(&mut events)),
        vec![
            pair("plugin:deactivated", "git"),
            pair("plugin:unregistered", "git")
        ]
    );
}

#[tokio::test]
async fn test_deactivate_all_respects_dependencies() {
    let registry = PluginRegistry::default();
    let log = journal();
    register(&registry, RecordingPlugin::new("notes", &log), PluginMetadata::new("notes", "Notes"));
    register(
        &registry,
        RecordingPlugin::new("notes-ui", &log),
        PluginMetadata::new("notes-ui", "Notes UI").depends_on("notes"),
    );
    register(&registry, RecordingPlugin::new("echo", &log), PluginMetadata::new("echo", "Echo"));

    let activated = registry.activate_all().await;
    assert!(activated.iter().all(|(_, ok)| *ok));
    assert_eq!(registry.get_active_plugins().len(), 3);
    log.lock().clear();

    let results = registry.deactivate_all().await;

    assert!(results.iter().all(|(_, ok)| *ok));
    assert!(registry.get_active_plugins().is_empty());
    let teardown: Vec<String> = log
        .lock()
        .iter()
        .filter(|entry| entry.starts_with("deactivate:"))
        .cloned()
        .collect();
    assert_eq!(
        teardown,
        vec!["deactivate:echo", "deactivate:notes-ui", "deactivate:notes"]
    );
}

// =============================================================================
// State change stream
// =============================================================================

#[tokio::test]
async fn test_state_changes_cover_every_transition() {
    let registry = PluginRegistry::default();
    let mut changes = registry.subscribe_state_changes();
    let log = journal();
    register(&registry, RecordingPlugin::new("git", &log), PluginMetadata::new("git", "Git"));

    assert!(registry.activate_plugin("git").await);
    assert!(registry.deactivate_plugin("git").await);

    let transitions: Vec<(PluginState, PluginState)> = drain_changes(&mut changes)
        .into_iter()
        .map(|c| (c.old_state, c.new_state))
        .collect();
    assert_eq!(
        transitions,
        vec![
            (PluginState::Discovered, PluginState::Registered),
            (PluginState::Registered, PluginState::Activating),
            (PluginState::Activating, PluginState::Active),
            (PluginState::Active, PluginState::Deactivating),
            (PluginState::Deactivating, PluginState::Inactive),
        ]
    );
}
