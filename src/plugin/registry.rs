//! Plugin registry.
//!
//! Process-scoped table of installed manifests plus a runtime enabled flag
//! per plugin. Unknown plugin IDs are indistinguishable from disabled ones:
//! lookups return `false` and writes are silent no-ops, so a stale reference
//! can never take down host startup.

use crate::core::{now, Error, Result, Timestamp};
use crate::plugin::manifest::PluginManifest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Registered plugin entry.
#[derive(Debug)]
struct RegisteredPlugin {
    manifest: PluginManifest,
    enabled: AtomicBool,
    registered_at: Timestamp,
}

/// Point-in-time view of a registry entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PluginRegistryEntry {
    /// Plugin manifest
    pub manifest: PluginManifest,
    /// Enabled at the time of the snapshot
    pub enabled: bool,
    /// Registration time
    pub registered_at: Timestamp,
}

/// Plugin registry.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    /// Entries in registration order
    plugins: Vec<RegisteredPlugin>,
    /// Plugin ID to position in `plugins`
    index: HashMap<String, usize>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the set of known manifests. Every plugin starts
    /// enabled.
    ///
    /// Empty or duplicate IDs are fatal: the registry is only built at boot.
    pub fn from_manifests<I>(manifests: I) -> Result<Self>
    where
        I: IntoIterator<Item = PluginManifest>,
    {
        let mut registry = Self::new();
        for manifest in manifests {
            manifest.validate()?;
            if registry.index.contains_key(&manifest.id) {
                return Err(Error::DuplicatePlugin(manifest.id));
            }
            registry.index.insert(manifest.id.clone(), registry.plugins.len());
            registry.plugins.push(RegisteredPlugin {
                manifest,
                enabled: AtomicBool::new(true),
                registered_at: now(),
            });
        }
        info!(plugins = registry.plugins.len(), "plugin registry built");
        Ok(registry)
    }

    fn entry(&self, plugin_id: &str) -> Option<&RegisteredPlugin> {
        self.index.get(plugin_id).map(|&i| &self.plugins[i])
    }

    /// Whether a plugin is registered and currently enabled.
    pub fn is_plugin_enabled(&self, plugin_id: &str) -> bool {
        self.entry(plugin_id)
            .map(|p| p.enabled.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Flip a plugin's enabled flag. Unknown IDs are ignored.
    pub fn set_plugin_enabled(&self, plugin_id: &str, enabled: bool) {
        match self.entry(plugin_id) {
            Some(entry) => {
                let previous = entry.enabled.swap(enabled, Ordering::AcqRel);
                if previous != enabled {
                    info!(plugin = plugin_id, enabled, "plugin state changed");
                }
            }
            None => debug!(plugin = plugin_id, "ignoring state change for unknown plugin"),
        }
    }

    /// Manifests of enabled plugins, in registration order.
    pub fn list_manifests(&self) -> Vec<PluginManifest> {
        self.plugins
            .iter()
            .filter(|p| p.enabled.load(Ordering::Acquire))
            .map(|p| p.manifest.clone())
            .collect()
    }

    /// Whether a plugin is registered, regardless of its enabled flag.
    pub fn contains(&self, plugin_id: &str) -> bool {
        self.index.contains_key(plugin_id)
    }

    /// Get a plugin's manifest, enabled or not.
    pub fn manifest(&self, plugin_id: &str) -> Option<&PluginManifest> {
        self.entry(plugin_id).map(|p| &p.manifest)
    }

    /// Snapshot of a single entry.
    pub fn get_entry(&self, plugin_id: &str) -> Option<PluginRegistryEntry> {
        self.entry(plugin_id).map(Self::snapshot)
    }

    /// Snapshot of all entries in registration order.
    pub fn entries(&self) -> Vec<PluginRegistryEntry> {
        self.plugins.iter().map(Self::snapshot).collect()
    }

    fn snapshot(p: &RegisteredPlugin) -> PluginRegistryEntry {
        PluginRegistryEntry {
            manifest: p.manifest.clone(),
            enabled: p.enabled.load(Ordering::Acquire),
            registered_at: p.registered_at,
        }
    }

    /// IDs of all registered plugins in registration order.
    pub fn plugin_ids(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.manifest.id.as_str()).collect()
    }

    /// Get plugin count.
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Number of enabled plugins.
    pub fn enabled_count(&self) -> usize {
        self.plugins
            .iter()
            .filter(|p| p.enabled.load(Ordering::Acquire))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PluginRegistry {
        PluginRegistry::from_manifests(vec![
            PluginManifest::new("invoice"),
            PluginManifest::new("payment"),
            PluginManifest::new("balance"),
        ])
        .unwrap()
    }

    #[test]
    fn test_registry_creation() {
        let registry = PluginRegistry::new();
        assert_eq!(registry.plugin_count(), 0);
        assert!(registry.list_manifests().is_empty());
    }

    #[test]
    fn test_plugins_start_enabled() {
        let registry = registry();
        assert_eq!(registry.plugin_count(), 3);
        assert_eq!(registry.enabled_count(), 3);
        assert!(registry.is_plugin_enabled("payment"));
    }

    #[test]
    fn test_unknown_plugin_is_disabled() {
        let registry = registry();
        assert!(!registry.is_plugin_enabled("sport-center"));
        assert!(!registry.is_plugin_enabled(""));

        registry.set_plugin_enabled("sport-center", true);
        assert!(!registry.is_plugin_enabled("sport-center"));
        assert!(!registry.contains("sport-center"));
        assert_eq!(registry.plugin_count(), 3);
    }

    #[test]
    fn test_toggle_plugin() {
        let registry = registry();
        registry.set_plugin_enabled("payment", false);
        assert!(!registry.is_plugin_enabled("payment"));
        assert_eq!(registry.get_entry("payment").map(|e| e.enabled), Some(false));

        registry.set_plugin_enabled("payment", true);
        assert!(registry.is_plugin_enabled("payment"));
    }

    #[test]
    fn test_list_manifests_order_and_filter() {
        let registry = registry();
        registry.set_plugin_enabled("payment", false);

        let ids: Vec<String> = registry.list_manifests().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["invoice".to_string(), "balance".to_string()]);
        assert_eq!(registry.plugin_ids(), vec!["invoice", "payment", "balance"]);
    }

    #[test]
    fn test_duplicate_registration() {
        let result = PluginRegistry::from_manifests(vec![
            PluginManifest::new("invoice"),
            PluginManifest::new("invoice"),
        ]);
        assert!(matches!(result, Err(Error::DuplicatePlugin(id)) if id == "invoice"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = PluginRegistry::from_manifests(vec![PluginManifest::new("")]);
        assert!(matches!(result, Err(Error::InvalidManifest(_))));
    }

    #[test]
    fn test_manifest_of_disabled_plugin() {
        let registry = registry();
        registry.set_plugin_enabled("balance", false);
        assert_eq!(registry.manifest("balance").map(|m| m.id.as_str()), Some("balance"));
        assert_eq!(registry.entries().len(), 3);
    }
}
