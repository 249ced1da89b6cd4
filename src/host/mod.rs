//! Host Module
//!
//! Boot-time configuration and the context that owns the registries.

pub mod config;
pub mod context;

pub use config::HostConfig;
pub use context::HostContext;
