//! Structured logging for the widget host.
//!
//! Log output goes through `tracing`; this module only installs the
//! subscriber from configuration.

use serde::{Deserialize, Serialize};
use tracing::Level;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warning level
    Warn,
    /// Error level
    Error,
}

impl LogLevel {
    /// Matching `tracing` level.
    pub fn as_tracing(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default multi-field text
    Full,
    /// Single-line compact text
    Compact,
}

/// Logger configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum log level
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include event targets (module paths)
    pub targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Full,
            targets: true,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// Returns `false` if a subscriber was already installed; the existing one
/// is kept.
pub fn init_logging(config: &LogConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_max_level(config.level.as_tracing())
        .with_target(config.targets);

    let result = match config.format {
        LogFormat::Full => builder.try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(LogLevel::Warn.as_tracing(), Level::WARN);
        assert_eq!(LogLevel::Debug.to_string(), "DEBUG");
    }

    #[test]
    fn test_config_serde() {
        let config: LogConfig = serde_json::from_str(r#"{"level": "debug"}"#).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Full);
    }

    #[test]
    fn test_init_is_idempotent() {
        let config = LogConfig::default();
        init_logging(&config);
        assert!(!init_logging(&config));
    }
}
