//! Widget Module
//!
//! Dynamic widget resolution:
//! - Widget mapping table
//! - Component interface and module loader seam
//! - Asynchronous component resolver
//! - Widget renderer

pub mod component;
pub mod loader;
pub mod mapping;
pub mod renderer;
pub mod resolver;

pub use component::{Component, ComponentExports, ComponentRef, FnComponent, View, WidgetProps};
pub use loader::{LoadResult, ModuleLoader, StaticModuleLoader};
pub use mapping::{WidgetMapping, WidgetMappingTable};
pub use renderer::{widget_key, Rendered, WidgetElement, WidgetRenderer};
pub use resolver::{
    ComponentResolver, FailurePolicy, ResolutionHandle, ResolutionState, ResolverConfig,
};
