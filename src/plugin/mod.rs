//! Plugin Module
//!
//! - Plugin manifests
//! - Plugin registry with runtime enable/disable state

pub mod manifest;
pub mod registry;

pub use manifest::{load_manifests, MenuItemDescriptor, PluginManifest, RouteDescriptor};
pub use registry::{PluginRegistry, PluginRegistryEntry};
