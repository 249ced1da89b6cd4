//! Plugin module loader seam.
//!
//! Packaging and code splitting plug in here: a loader turns a plugin ID
//! into the set of components the plugin exports, asynchronously.

use crate::core::LoadError;
use crate::widget::component::ComponentExports;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Result type for module loads.
pub type LoadResult = std::result::Result<ComponentExports, LoadError>;

/// Asynchronously loads a plugin's component module.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Load the exports of a plugin.
    async fn load(&self, plugin_id: &str) -> LoadResult;
}

type ModuleFactory = Arc<dyn Fn() -> BoxFuture<'static, LoadResult> + Send + Sync>;

/// In-process loader backed by registered factories.
#[derive(Clone, Default)]
pub struct StaticModuleLoader {
    modules: HashMap<String, ModuleFactory>,
}

impl StaticModuleLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module whose exports are available immediately.
    pub fn with_module(self, plugin_id: &str, exports: ComponentExports) -> Self {
        self.with_factory(plugin_id, move || {
            let exports = exports.clone();
            async move { Ok(exports) }
        })
    }

    /// Register an async factory producing a plugin's exports.
    pub fn with_factory<F, Fut>(mut self, plugin_id: &str, factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LoadResult> + Send + 'static,
    {
        let factory: ModuleFactory =
            Arc::new(move || -> BoxFuture<'static, LoadResult> { Box::pin(factory()) });
        self.modules.insert(plugin_id.to_string(), factory);
        self
    }

    /// Whether a module is registered for the plugin.
    pub fn has_module(&self, plugin_id: &str) -> bool {
        self.modules.contains_key(plugin_id)
    }
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn load(&self, plugin_id: &str) -> LoadResult {
        let factory = self
            .modules
            .get(plugin_id)
            .cloned()
            .ok_or_else(|| LoadError::ModuleNotFound(plugin_id.to_string()))?;
        factory().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::component::FnComponent;
    use serde_json::Value;

    #[tokio::test]
    async fn test_static_module() {
        let loader = StaticModuleLoader::new().with_module(
            "balance",
            ComponentExports::new().with_component(FnComponent::new("BalanceCard", |_| Value::Null)),
        );

        let exports = loader.load("balance").await.unwrap();
        assert!(exports.get("BalanceCard").is_some());
        assert!(loader.has_module("balance"));
    }

    #[tokio::test]
    async fn test_unknown_module() {
        let loader = StaticModuleLoader::new();
        let result = loader.load("invoice").await;
        assert!(matches!(result, Err(LoadError::ModuleNotFound(id)) if id == "invoice"));
    }

    #[tokio::test]
    async fn test_failing_factory() {
        let loader = StaticModuleLoader::new().with_factory("payment", || async {
            Err(LoadError::Failed("chunk missing".to_string()))
        });

        let result = loader.load("payment").await;
        assert_eq!(result.unwrap_err(), LoadError::Failed("chunk missing".to_string()));
    }
}
