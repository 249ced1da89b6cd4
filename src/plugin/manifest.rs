//! Plugin manifest definition.
//!
//! Static declaration of a plugin's identity and navigational contributions.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};

/// A named navigation target contributed by a plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Route name, unique within the plugin
    pub name: String,
    /// Translation key of the screen title
    #[serde(default)]
    pub title_key: Option<String>,
}

impl RouteDescriptor {
    /// Create a route.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            title_key: None,
        }
    }

    /// Set the title translation key.
    pub fn with_title_key(mut self, key: &str) -> Self {
        self.title_key = Some(key.to_string());
        self
    }
}

/// A menu entry contributed by a plugin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemDescriptor {
    /// Menu item ID
    pub id: String,
    /// Translation key of the label
    pub label_key: String,
    /// Route opened by the item
    pub route: String,
    /// Icon name
    #[serde(default)]
    pub icon: Option<String>,
}

impl MenuItemDescriptor {
    /// Create a menu item.
    pub fn new(id: &str, label_key: &str, route: &str) -> Self {
        Self {
            id: id.to_string(),
            label_key: label_key.to_string(),
            route: route.to_string(),
            icon: None,
        }
    }

    /// Set icon.
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }
}

/// Plugin manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    /// Plugin ID, stable across app versions
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Version
    #[serde(default)]
    pub version: String,
    /// Routes in display order
    #[serde(default)]
    pub routes: Vec<RouteDescriptor>,
    /// Menu entries in display order
    #[serde(default, rename = "menuItems", alias = "menu_items")]
    pub menu_items: Vec<MenuItemDescriptor>,
}

impl PluginManifest {
    /// Create a new manifest.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            version: "1.0.0".to_string(),
            routes: Vec::new(),
            menu_items: Vec::new(),
        }
    }

    /// Set display name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set version.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    /// Add route.
    pub fn with_route(mut self, route: RouteDescriptor) -> Self {
        self.routes.push(route);
        self
    }

    /// Add menu item.
    pub fn with_menu_item(mut self, item: MenuItemDescriptor) -> Self {
        self.menu_items.push(item);
        self
    }

    /// Check the manifest invariants that do not depend on other manifests.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::InvalidManifest("missing plugin id".to_string()));
        }
        Ok(())
    }

    /// Parse a single manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| Error::InvalidManifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }
}

/// Parse a JSON array of manifests.
pub fn load_manifests(json: &str) -> Result<Vec<PluginManifest>> {
    let manifests: Vec<PluginManifest> =
        serde_json::from_str(json).map_err(|e| Error::InvalidManifest(e.to_string()))?;
    for manifest in &manifests {
        manifest.validate()?;
    }
    Ok(manifests)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_builder() {
        let manifest = PluginManifest::new("invoice")
            .with_name("Invoice")
            .with_route(RouteDescriptor::new("InvoiceList"))
            .with_route(RouteDescriptor::new("InvoiceDetail"))
            .with_menu_item(MenuItemDescriptor::new("invoices", "menu.invoices", "InvoiceList"));

        assert_eq!(manifest.id, "invoice");
        assert_eq!(manifest.routes[0].name, "InvoiceList");
        assert_eq!(manifest.routes[1].name, "InvoiceDetail");
        assert_eq!(manifest.menu_items.len(), 1);
    }

    #[test]
    fn test_from_json() {
        let manifest = PluginManifest::from_json(
            r#"{
                "id": "donation",
                "routes": [{"name": "DonationHome"}],
                "menuItems": [{"id": "donate", "label_key": "menu.donate", "route": "DonationHome"}]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.id, "donation");
        assert_eq!(manifest.routes.len(), 1);
        assert_eq!(manifest.menu_items[0].route, "DonationHome");
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let result = PluginManifest::from_json(r#"{"routes": []}"#);
        assert!(matches!(result, Err(Error::InvalidManifest(_))));

        let result = PluginManifest::from_json(r#"{"id": "  "}"#);
        assert!(matches!(result, Err(Error::InvalidManifest(_))));
    }

    #[test]
    fn test_load_manifests() {
        let manifests = load_manifests(r#"[{"id": "balance"}, {"id": "payment"}]"#).unwrap();
        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[1].id, "payment");

        assert!(load_manifests(r#"[{"id": "balance"}, {"id": ""}]"#).is_err());
    }
}
