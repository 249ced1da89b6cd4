//! Host configuration.
//!
//! Configuration-driven setup of the registry, resolver and refresh
//! coordinator.

use crate::core::{Error, Result};
use crate::monitoring::LogConfig;
use crate::refresh::RefreshConfig;
use crate::widget::{ResolverConfig, WidgetMapping};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Host configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Component resolver settings
    pub resolver: ResolverConfig,
    /// Refresh coordination settings
    pub refresh: RefreshConfig,
    /// Plugins disabled at boot; unknown IDs are ignored
    pub disabled_plugins: Vec<String>,
    /// Widget mapping table; the built-in catalog when absent
    pub widgets: Option<Vec<WidgetMapping>>,
    /// Logging settings, installed by `HostContext::boot_with_logging`
    pub logging: LogConfig,
}

impl HostConfig {
    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Disable a plugin at boot.
    pub fn with_disabled_plugin(mut self, plugin_id: &str) -> Self {
        self.disabled_plugins.push(plugin_id.to_string());
        self
    }

    /// Use an explicit widget mapping table.
    pub fn with_widgets(mut self, widgets: Vec<WidgetMapping>) -> Self {
        self.widgets = Some(widgets);
        self
    }

    /// Set resolver settings.
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::FailurePolicy;

    #[test]
    fn test_default_config() {
        let config = HostConfig::default();
        assert!(config.resolver.cache);
        assert!(config.disabled_plugins.is_empty());
        assert!(config.widgets.is_none());
    }

    #[test]
    fn test_from_json() {
        let config = HostConfig::from_json(
            r#"{
                "resolver": {"cache": true, "failure_policy": "sticky", "load_timeout_ms": 5000},
                "refresh": {"callback_timeout_ms": 1000},
                "disabled_plugins": ["donation"],
                "widgets": [
                    {"widgetId": "card-summary", "pluginId": "card-transaction", "componentName": "CardSummary"}
                ],
                "logging": {"level": "warn", "format": "compact"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.resolver.failure_policy, FailurePolicy::Sticky);
        assert_eq!(config.refresh.callback_timeout_ms, Some(1000));
        assert_eq!(config.disabled_plugins, vec!["donation".to_string()]);
        assert_eq!(config.widgets.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_invalid_json() {
        let result = HostConfig::from_json(r#"{"resolver": {"cache": "yes"}}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = HostConfig::from_file("/nonexistent/widget-host.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
