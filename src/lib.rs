//! # widget-host
//!
//! Plugin registry and dynamic widget resolution for a modular host shell:
//! - **Plugin**: manifests and the runtime enabled/disabled registry
//! - **Widget**: widget mapping, asynchronous component resolution, rendering
//! - **Refresh**: host-triggered refresh fan-out across mounted widgets
//! - **Host**: configuration and the boot-time context
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use widget_host::host::{HostConfig, HostContext};
//! use widget_host::widget::{ComponentExports, FnComponent, StaticModuleLoader};
//!
//! #[tokio::main]
//! async fn main() {
//!     let loader = StaticModuleLoader::new().with_module(
//!         "card-transaction",
//!         ComponentExports::new()
//!             .with_component(FnComponent::new("CardSummary", |_| serde_json::json!({}))),
//!     );
//!     let host = HostContext::boot_builtin(&HostConfig::default(), Arc::new(loader)).unwrap();
//!
//!     let slot = host.renderer().render_settled("card-summary", true, true).await;
//!     println!("{:?}", slot);
//! }
//! ```

pub mod catalog;
pub mod core;
pub mod host;
pub mod monitoring;
pub mod plugin;
pub mod refresh;
pub mod widget;

pub use crate::core::error::{Error, Result};
