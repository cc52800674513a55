//! Plugin system configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Plugin system configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Deadline for a plugin's `activate` call (in milliseconds, 0 = none)
    #[serde(default = "default_activation_timeout_ms")]
    pub activation_timeout_ms: u64,

    /// Deadline for a plugin's `deactivate` call (in milliseconds, 0 = none)
    #[serde(default = "default_deactivation_timeout_ms")]
    pub deactivation_timeout_ms: u64,

    /// Plugins that are explicitly disabled
    #[serde(default)]
    pub disabled_plugins: Vec<String>,

    /// Plugins that are explicitly enabled (if empty, all are enabled)
    #[serde(default)]
    pub enabled_plugins: Vec<String>,

    /// Plugins the host activates right after registration
    #[serde(default)]
    pub activate_on_startup: Vec<String>,

    /// Plugin-specific configurations, handed to each plugin on activation
    #[serde(default)]
    pub plugin_configs: HashMap<String, serde_json::Value>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            activation_timeout_ms: default_activation_timeout_ms(),
            deactivation_timeout_ms: default_deactivation_timeout_ms(),
            disabled_plugins: Vec::new(),
            enabled_plugins: Vec::new(),
            activate_on_startup: Vec::new(),
            plugin_configs: HashMap::new(),
        }
    }
}

impl PluginConfig {
    /// Check if a plugin is enabled.
    pub fn is_plugin_enabled(&self, plugin_id: &str) -> bool {
        if self.disabled_plugins.iter().any(|id| id == plugin_id) {
            return false;
        }

        // If enabled_plugins is not empty, it acts as an allow-list
        if !self.enabled_plugins.is_empty() {
            return self.enabled_plugins.iter().any(|id| id == plugin_id);
        }

        true
    }

    /// Get configuration for a specific plugin.
    pub fn get_plugin_config(&self, plugin_id: &str) -> Option<&serde_json::Value> {
        self.plugin_configs.get(plugin_id)
    }

    /// Set configuration for a specific plugin.
    pub fn set_plugin_config(&mut self, plugin_id: &str, config: serde_json::Value) {
        self.plugin_configs.insert(plugin_id.to_string(), config);
    }

    /// Enable a plugin.
    pub fn enable_plugin(&mut self, plugin_id: &str) {
        self.disabled_plugins.retain(|id| id != plugin_id);
        if !self.enabled_plugins.is_empty() && !self.enabled_plugins.iter().any(|id| id == plugin_id)
        {
            self.enabled_plugins.push(plugin_id.to_string());
        }
    }

    /// Disable a plugin.
    pub fn disable_plugin(&mut self, plugin_id: &str) {
        if !self.disabled_plugins.iter().any(|id| id == plugin_id) {
            self.disabled_plugins.push(plugin_id.to_string());
        }
        self.enabled_plugins.retain(|id| id != plugin_id);
    }

    /// Deadline applied to `activate`, if any.
    pub fn activation_timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.activation_timeout_ms)
    }

    /// Deadline applied to `deactivate`, if any.
    pub fn deactivation_timeout(&self) -> Option<Duration> {
        timeout_from_ms(self.deactivation_timeout_ms)
    }
}

/// Convert a millisecond setting to a deadline; `0` means no deadline.
pub fn timeout_from_ms(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn default_activation_timeout_ms() -> u64 {
    30_000
}

fn default_deactivation_timeout_ms() -> u64 {
    10_000
}
