//! Widget renderer.
//!
//! Resolves an abstract widget slot to the plugin component behind it.
//! Optional slots fail silent: an unknown widget, a disabled plugin or a
//! broken component all render nothing rather than an error.
//!
//! Rendering never restarts a failed load. A host that wants to give a
//! broken slot another chance (for example on remount) calls
//! [`WidgetRenderer::retry`].

use crate::plugin::PluginRegistry;
use crate::widget::component::{ComponentRef, View, WidgetProps};
use crate::widget::mapping::{WidgetMapping, WidgetMappingTable};
use crate::widget::resolver::{ComponentResolver, ResolutionHandle, ResolutionState};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Identity key of a widget slot, stable across re-renders.
pub fn widget_key(widget_id: &str) -> String {
    format!("widget:{}", widget_id)
}

/// A resolved widget ready to be rendered.
#[derive(Clone)]
pub struct WidgetElement {
    /// Slot identity key
    pub key: String,
    /// Widget ID
    pub widget_id: String,
    /// Resolved component
    pub component: ComponentRef,
    /// Props passed to the component
    pub props: WidgetProps,
}

impl WidgetElement {
    /// Render the component with its props.
    pub fn view(&self) -> View {
        self.component.render(&self.props)
    }
}

impl fmt::Debug for WidgetElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetElement")
            .field("key", &self.key)
            .field("component", &self.component.name())
            .field("props", &self.props)
            .finish()
    }
}

/// Output of rendering a widget slot.
#[derive(Clone, Debug)]
pub enum Rendered {
    /// Neutral placeholder while the component loads
    Loading {
        /// Slot identity key
        key: String,
    },
    /// The resolved widget
    Widget(WidgetElement),
}

impl Rendered {
    /// Slot identity key.
    pub fn key(&self) -> &str {
        match self {
            Rendered::Loading { key } => key,
            Rendered::Widget(element) => &element.key,
        }
    }

    /// Whether this is the loading placeholder.
    pub fn is_loading(&self) -> bool {
        matches!(self, Rendered::Loading { .. })
    }

    /// The resolved widget, if any.
    pub fn element(&self) -> Option<&WidgetElement> {
        match self {
            Rendered::Widget(element) => Some(element),
            Rendered::Loading { .. } => None,
        }
    }
}

/// Renders widget slots from the registry, mapping table and resolver.
#[derive(Clone, Debug)]
pub struct WidgetRenderer {
    registry: Arc<PluginRegistry>,
    mappings: Arc<WidgetMappingTable>,
    resolver: Arc<ComponentResolver>,
}

impl WidgetRenderer {
    /// Create a renderer.
    pub fn new(
        registry: Arc<PluginRegistry>,
        mappings: Arc<WidgetMappingTable>,
        resolver: Arc<ComponentResolver>,
    ) -> Self {
        Self {
            registry,
            mappings,
            resolver,
        }
    }

    /// Render a widget slot.
    pub fn render(&self, widget_id: &str, is_active: bool, is_visible: bool) -> Option<Rendered> {
        self.render_with_extras(widget_id, is_active, is_visible, Map::new())
    }

    /// Render a widget slot, passing plugin-declared extras through.
    pub fn render_with_extras(
        &self,
        widget_id: &str,
        is_active: bool,
        is_visible: bool,
        extras: Map<String, Value>,
    ) -> Option<Rendered> {
        let (mapping, handle) = self.begin(widget_id, false)?;
        finish(mapping, handle.state(), WidgetProps { is_active, is_visible, extras })
    }

    /// Render a widget slot, reloading its component if the last load failed.
    ///
    /// Whether a failure is actually reloaded follows the resolver's
    /// [`FailurePolicy`](crate::widget::FailurePolicy).
    pub fn retry(&self, widget_id: &str, is_active: bool, is_visible: bool) -> Option<Rendered> {
        let (mapping, handle) = self.begin(widget_id, true)?;
        finish(mapping, handle.state(), WidgetProps::new(is_active, is_visible))
    }

    /// Render a widget slot once its resolution has settled.
    ///
    /// Never yields the loading placeholder.
    pub async fn render_settled(
        &self,
        widget_id: &str,
        is_active: bool,
        is_visible: bool,
    ) -> Option<Rendered> {
        let (mapping, handle) = self.begin(widget_id, false)?;
        let state = handle.settled().await;
        finish(mapping, state, WidgetProps::new(is_active, is_visible))
    }

    /// Render several slots in order, dropping the ones that produce nothing.
    pub fn render_all<'a, I>(&self, widget_ids: I, is_active: bool, is_visible: bool) -> Vec<Rendered>
    where
        I: IntoIterator<Item = &'a str>,
    {
        widget_ids
            .into_iter()
            .filter_map(|id| self.render(id, is_active, is_visible))
            .collect()
    }

    // Steps shared by every render path: mapping lookup, enabled check,
    // resolution. The resolver is never touched for disabled plugins.
    fn begin(&self, widget_id: &str, retry: bool) -> Option<(&WidgetMapping, ResolutionHandle)> {
        let mapping = self.mappings.lookup(widget_id)?;
        if !self.registry.is_plugin_enabled(&mapping.plugin_id) {
            return None;
        }
        let handle = if retry {
            self.resolver.retry(&mapping.plugin_id, &mapping.component_name)
        } else {
            self.resolver.resolve(&mapping.plugin_id, &mapping.component_name)
        };
        Some((mapping, handle))
    }
}

fn finish(mapping: &WidgetMapping, state: ResolutionState, props: WidgetProps) -> Option<Rendered> {
    let key = widget_key(&mapping.widget_id);
    match state {
        ResolutionState::Loading => Some(Rendered::Loading { key }),
        ResolutionState::Failed(kind) => {
            debug!(widget = %mapping.widget_id, error = %kind, "widget omitted");
            None
        }
        ResolutionState::Ready(component) => Some(Rendered::Widget(WidgetElement {
            key,
            widget_id: mapping.widget_id.clone(),
            component,
            props,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LoadError;
    use crate::plugin::PluginManifest;
    use crate::widget::component::{ComponentExports, FnComponent};
    use crate::widget::loader::StaticModuleLoader;
    use crate::widget::resolver::{FailurePolicy, ResolverConfig};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixture {
        registry: Arc<PluginRegistry>,
        renderer: WidgetRenderer,
        loads: Arc<AtomicUsize>,
    }

    fn fixture(config: ResolverConfig) -> Fixture {
        let registry = Arc::new(
            PluginRegistry::from_manifests(vec![
                PluginManifest::new("card-transaction"),
                PluginManifest::new("invoice"),
            ])
            .unwrap(),
        );
        let mappings = Arc::new(
            WidgetMappingTable::from_mappings(vec![
                WidgetMapping::new("card-summary", "card-transaction", "CardSummary"),
                WidgetMapping::new("card-missing", "card-transaction", "CardHistory"),
                WidgetMapping::new("invoice-list", "invoice", "InvoiceList"),
                WidgetMapping::new("donation", "donation", "DonationBanner"),
            ])
            .unwrap(),
        );

        let loads = Arc::new(AtomicUsize::new(0));
        let counter = loads.clone();
        let loader = StaticModuleLoader::new()
            .with_factory("card-transaction", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    Ok(ComponentExports::new().with_component(FnComponent::new(
                        "CardSummary",
                        |props| json!({ "type": "CardSummary", "visible": props.is_visible }),
                    )))
                }
            })
            .with_factory("invoice", || async {
                Err(LoadError::Failed("bundle corrupt".to_string()))
            });

        let resolver = Arc::new(ComponentResolver::new(registry.clone(), Arc::new(loader), config));
        Fixture {
            renderer: WidgetRenderer::new(registry.clone(), mappings, resolver),
            registry,
            loads,
        }
    }

    #[tokio::test]
    async fn test_unknown_widget() {
        let f = fixture(ResolverConfig::default());
        assert!(f.renderer.render("weather", true, true).is_none());
        assert!(f.renderer.render_settled("weather", true, true).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_plugin_never_loads() {
        let f = fixture(ResolverConfig::default());
        f.registry.set_plugin_enabled("card-transaction", false);

        assert!(f.renderer.render("card-summary", true, true).is_none());
        assert!(f.renderer.render_settled("card-summary", true, true).await.is_none());
        assert_eq!(f.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unregistered_plugin_renders_nothing() {
        let f = fixture(ResolverConfig::default());
        assert!(f.renderer.render_settled("donation", true, true).await.is_none());
    }

    #[tokio::test]
    async fn test_loading_then_ready() {
        let f = fixture(ResolverConfig::default());

        let first = f.renderer.render("card-summary", true, false).unwrap();
        assert!(first.is_loading());
        assert_eq!(first.key(), "widget:card-summary");

        let settled = f.renderer.render_settled("card-summary", true, false).await.unwrap();
        let element = settled.element().unwrap();
        assert_eq!(element.key, "widget:card-summary");
        assert!(element.props.is_active);
        assert!(!element.props.is_visible);
        assert_eq!(element.view()["visible"], json!(false));

        // cached: the synchronous path is ready now
        let again = f.renderer.render("card-summary", false, true).unwrap();
        assert!(!again.is_loading());
        assert_eq!(f.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_render_nothing() {
        let f = fixture(ResolverConfig::default());
        assert!(f.renderer.render_settled("invoice-list", true, true).await.is_none());
        assert!(f.renderer.render_settled("card-missing", true, true).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_widget_stays_absent() {
        let f = fixture(ResolverConfig::default());
        assert!(f.renderer.render_settled("card-missing", true, true).await.is_none());

        for _ in 0..5 {
            assert!(f.renderer.render("card-missing", true, true).is_none());
        }
        assert_eq!(f.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_reloads_failed_widget() {
        let f = fixture(ResolverConfig::default());
        assert!(f.renderer.render_settled("card-missing", true, true).await.is_none());

        let retried = f.renderer.retry("card-missing", true, true).unwrap();
        assert!(retried.is_loading());
        assert!(f.renderer.render_settled("card-missing", true, true).await.is_none());
        assert_eq!(f.loads.load(Ordering::SeqCst), 2);

        // a ready widget is not reloaded
        f.renderer.render_settled("card-summary", true, true).await;
        let loads = f.loads.load(Ordering::SeqCst);
        assert!(!f.renderer.retry("card-summary", true, true).unwrap().is_loading());
        assert_eq!(f.loads.load(Ordering::SeqCst), loads);
    }

    #[tokio::test]
    async fn test_sticky_retry_keeps_failure() {
        let f = fixture(ResolverConfig::default().with_failure_policy(FailurePolicy::Sticky));
        assert!(f.renderer.render_settled("card-missing", true, true).await.is_none());
        assert!(f.renderer.retry("card-missing", true, true).is_none());
        assert_eq!(f.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extras_pass_through() {
        let f = fixture(ResolverConfig::default());
        f.renderer.render_settled("card-summary", true, true).await;

        let mut extras = Map::new();
        extras.insert("masked".to_string(), json!(true));
        let rendered = f
            .renderer
            .render_with_extras("card-summary", true, true, extras)
            .unwrap();
        assert_eq!(rendered.element().unwrap().props.extras["masked"], json!(true));
    }

    #[tokio::test]
    async fn test_render_all_skips_absent() {
        let f = fixture(ResolverConfig::default());
        f.renderer.render_settled("card-summary", true, true).await;

        let rendered = f
            .renderer
            .render_all(["weather", "card-summary", "donation"], true, true);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].key(), "widget:card-summary");
    }

    #[tokio::test]
    async fn test_uncached_render_settled() {
        let f = fixture(ResolverConfig::uncached());
        assert!(f.renderer.render_settled("card-summary", true, true).await.is_some());
        assert!(f.renderer.render_settled("card-summary", true, true).await.is_some());
        assert_eq!(f.loads.load(Ordering::SeqCst), 2);
    }
}
