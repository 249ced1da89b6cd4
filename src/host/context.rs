//! Host context.
//!
//! The single construction point of the process-scoped registries. Nothing
//! here is global: the host passes the context (or the shared handles it
//! hands out) to whoever needs them.

use crate::catalog;
use crate::core::Result;
use crate::host::config::HostConfig;
use crate::monitoring::init_logging;
use crate::plugin::{PluginManifest, PluginRegistry};
use crate::refresh::{RefreshCoordinator, RefreshReport};
use crate::widget::{ComponentResolver, ModuleLoader, Rendered, WidgetMappingTable, WidgetRenderer};
use std::sync::Arc;
use tracing::{debug, info};

/// Booted host state.
#[derive(Clone, Debug)]
pub struct HostContext {
    registry: Arc<PluginRegistry>,
    mappings: Arc<WidgetMappingTable>,
    resolver: Arc<ComponentResolver>,
    renderer: WidgetRenderer,
    refresh: RefreshCoordinator,
}

impl HostContext {
    /// Boot the host from configuration, manifests and a module loader.
    ///
    /// Manifest and mapping errors are fatal here and nowhere else.
    pub fn boot(
        config: &HostConfig,
        manifests: Vec<PluginManifest>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Result<Self> {
        let registry = Arc::new(PluginRegistry::from_manifests(manifests)?);
        for plugin_id in &config.disabled_plugins {
            registry.set_plugin_enabled(plugin_id, false);
        }

        let widgets = config
            .widgets
            .clone()
            .unwrap_or_else(catalog::builtin_widgets);
        let mappings = Arc::new(WidgetMappingTable::from_mappings(widgets)?);

        let resolver = Arc::new(ComponentResolver::new(
            registry.clone(),
            loader,
            config.resolver.clone(),
        ));
        let renderer = WidgetRenderer::new(registry.clone(), mappings.clone(), resolver.clone());
        let refresh = RefreshCoordinator::new(config.refresh.clone());

        info!(
            plugins = registry.plugin_count(),
            enabled = registry.enabled_count(),
            widgets = mappings.len(),
            cache = config.resolver.cache,
            "host booted"
        );

        Ok(Self {
            registry,
            mappings,
            resolver,
            renderer,
            refresh,
        })
    }

    /// Install the configured log subscriber, then boot.
    ///
    /// An already installed global subscriber is left in place.
    pub fn boot_with_logging(
        config: &HostConfig,
        manifests: Vec<PluginManifest>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Result<Self> {
        if !init_logging(&config.logging) {
            debug!("log subscriber already installed");
        }
        Self::boot(config, manifests, loader)
    }

    /// Boot with the built-in plugin catalog.
    pub fn boot_builtin(config: &HostConfig, loader: Arc<dyn ModuleLoader>) -> Result<Self> {
        Self::boot(config, catalog::builtin_manifests(), loader)
    }

    /// Plugin registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Widget mapping table.
    pub fn mappings(&self) -> &Arc<WidgetMappingTable> {
        &self.mappings
    }

    /// Component resolver.
    pub fn resolver(&self) -> &Arc<ComponentResolver> {
        &self.resolver
    }

    /// Widget renderer.
    pub fn renderer(&self) -> &WidgetRenderer {
        &self.renderer
    }

    /// Refresh coordinator.
    pub fn refresh(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Render a widget slot.
    pub fn render(&self, widget_id: &str, is_active: bool, is_visible: bool) -> Option<Rendered> {
        self.renderer.render(widget_id, is_active, is_visible)
    }

    /// Trigger a refresh of every registered widget.
    pub async fn refresh_all(&self) -> RefreshReport {
        self.refresh.refresh_all().await
    }
}
