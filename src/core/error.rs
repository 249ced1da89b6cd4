//! Error types for the widget host.

use thiserror::Error;

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while booting or configuring the host.
///
/// Runtime lookups never produce these: unknown plugins and widgets are
/// modelled as absent values, and failed resolutions as a terminal state.
#[derive(Error, Debug)]
pub enum Error {
    // Manifest errors
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Plugin {0} is already registered")]
    DuplicatePlugin(String),

    // Widget errors
    #[error("Widget {0} is already mapped")]
    DuplicateWidget(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Refresh errors
    #[error("Refresh callback failed: {0}")]
    CallbackFailure(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

/// Why a component resolution ended in the failed state.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ResolveErrorKind {
    #[error("plugin not found")]
    PluginNotFound,

    #[error("component load failed: {0}")]
    ComponentLoadError(String),

    #[error("component not found in plugin exports")]
    ComponentNotFound,

    #[error("component load timed out after {0} ms")]
    LoadTimeout(u64),
}

/// Error reported by a module loader.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum LoadError {
    #[error("no module for plugin {0}")]
    ModuleNotFound(String),

    #[error("{0}")]
    Failed(String),
}

impl From<LoadError> for ResolveErrorKind {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::ModuleNotFound(_) => ResolveErrorKind::PluginNotFound,
            LoadError::Failed(msg) => ResolveErrorKind::ComponentLoadError(msg),
        }
    }
}
