//! Widget mapping table.
//!
//! Static lookup from an abstract widget ID to the plugin component that
//! implements it.

use crate::core::{ComponentKey, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps a widget slot to a plugin component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetMapping {
    /// Widget ID
    #[serde(rename = "widgetId", alias = "widget_id")]
    pub widget_id: String,
    /// Plugin providing the component; may not be enabled
    #[serde(rename = "pluginId", alias = "plugin_id")]
    pub plugin_id: String,
    /// Exported component name
    #[serde(rename = "componentName", alias = "component_name")]
    pub component_name: String,
}

impl WidgetMapping {
    /// Create a new mapping.
    pub fn new(widget_id: &str, plugin_id: &str, component_name: &str) -> Self {
        Self {
            widget_id: widget_id.to_string(),
            plugin_id: plugin_id.to_string(),
            component_name: component_name.to_string(),
        }
    }

    /// Resolution key of the mapped component.
    pub fn component_key(&self) -> ComponentKey {
        ComponentKey::new(&self.plugin_id, &self.component_name)
    }
}

/// Read-only widget mapping table.
#[derive(Clone, Debug, Default)]
pub struct WidgetMappingTable {
    mappings: HashMap<String, WidgetMapping>,
}

impl WidgetMappingTable {
    /// Build the table. Duplicate widget IDs are rejected.
    pub fn from_mappings<I>(mappings: I) -> Result<Self>
    where
        I: IntoIterator<Item = WidgetMapping>,
    {
        let mut table = HashMap::new();
        for mapping in mappings {
            if mapping.widget_id.is_empty() {
                return Err(Error::Config("widget mapping without id".to_string()));
            }
            if table.contains_key(&mapping.widget_id) {
                return Err(Error::DuplicateWidget(mapping.widget_id));
            }
            table.insert(mapping.widget_id.clone(), mapping);
        }
        Ok(Self { mappings: table })
    }

    /// Look up a widget.
    pub fn lookup(&self, widget_id: &str) -> Option<&WidgetMapping> {
        self.mappings.get(widget_id)
    }

    /// Number of mapped widgets.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Iterate over mappings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &WidgetMapping> {
        self.mappings.values()
    }
}
