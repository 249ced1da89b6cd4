//! Common types used across host modules.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Key of a component resolution: which export of which plugin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    /// Plugin ID
    pub plugin_id: String,
    /// Exported component name
    pub component_name: String,
}

impl ComponentKey {
    /// Create a new key.
    pub fn new(plugin_id: &str, component_name: &str) -> Self {
        Self {
            plugin_id: plugin_id.to_string(),
            component_name: component_name.to_string(),
        }
    }
}

impl std::fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.plugin_id, self.component_name)
    }
}

/// Convert an optional millisecond setting into a duration; zero means none.
pub fn millis(ms: Option<u64>) -> Option<Duration> {
    ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}
