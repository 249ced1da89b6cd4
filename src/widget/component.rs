//! Renderable component interface.
//!
//! Every component a plugin exports conforms to one rendering interface.
//! Rendering output is an opaque view description handed back to the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque view description produced by a component.
pub type View = Value;

/// Props passed to every widget component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetProps {
    /// Slot is the focused one
    pub is_active: bool,
    /// Slot is on screen
    pub is_visible: bool,
    /// Plugin-declared extras, passed through untouched
    #[serde(default)]
    pub extras: Map<String, Value>,
}

impl WidgetProps {
    /// Create props.
    pub fn new(is_active: bool, is_visible: bool) -> Self {
        Self {
            is_active,
            is_visible,
            extras: Map::new(),
        }
    }

    /// Add an extra prop.
    pub fn with_extra(mut self, key: &str, value: Value) -> Self {
        self.extras.insert(key.to_string(), value);
        self
    }
}

/// A renderable component exported by a plugin.
pub trait Component: Send + Sync {
    /// Export name.
    fn name(&self) -> &str;

    /// Render with the given props.
    fn render(&self, props: &WidgetProps) -> View;
}

/// Shared reference to a resolved component.
pub type ComponentRef = Arc<dyn Component>;

/// Component backed by a closure.
pub struct FnComponent {
    name: String,
    render: Box<dyn Fn(&WidgetProps) -> View + Send + Sync>,
}

impl FnComponent {
    /// Create a component from a render function.
    pub fn new<F>(name: &str, render: F) -> Self
    where
        F: Fn(&WidgetProps) -> View + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            render: Box::new(render),
        }
    }
}

impl Component for FnComponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, props: &WidgetProps) -> View {
        (self.render)(props)
    }
}

impl fmt::Debug for FnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent").field("name", &self.name).finish()
    }
}

/// Components exported by one loaded plugin module, keyed by name.
#[derive(Clone, Default)]
pub struct ComponentExports {
    components: HashMap<String, ComponentRef>,
}

impl ComponentExports {
    /// Create empty exports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Export a component under its own name.
    pub fn with_component(mut self, component: impl Component + 'static) -> Self {
        self.insert(Arc::new(component));
        self
    }

    /// Export a shared component under its own name.
    pub fn insert(&mut self, component: ComponentRef) {
        self.components.insert(component.name().to_string(), component);
    }

    /// Get an export by name.
    pub fn get(&self, name: &str) -> Option<ComponentRef> {
        self.components.get(name).cloned()
    }

    /// Exported names.
    pub fn names(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    /// Number of exports.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether nothing is exported.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl fmt::Debug for ComponentExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentExports")
            .field("components", &self.names())
            .finish()
    }
}
