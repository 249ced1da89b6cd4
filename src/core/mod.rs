//! Core utilities and common types for the widget host.

pub mod error;
pub mod types;

pub use error::{Error, LoadError, ResolveErrorKind, Result};
pub use types::*;
