//! Configuration schema definitions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

/// Root configuration structure.
///
/// Besides `logging`, every top-level table is kept as a raw section for the
/// adapter that owns it:
///
/// ```toml
/// [logging]
/// level = "debug"
///
/// [telegram]
/// token = "123456:ABC"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelerouteConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Adapter sections, keyed by table name.
    #[serde(flatten)]
    pub sections: BTreeMap<String, serde_json::Value>,
}

impl TelerouteConfig {
    /// Deserializes the `name` section into `T`; `None` if the section is absent.
    pub fn section<T: DeserializeOwned>(&self, name: &str) -> ConfigResult<Option<T>> {
        self.sections
            .get(name)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| ConfigError::Section {
                    section: name.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }

    /// Checks the settings serde cannot check on its own.
    pub fn validate(&self) -> ConfigResult<()> {
        self.logging.validate()
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Requires `file_path`.
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// The `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,

    /// Log file for `output = "file"`.
    pub file_path: Option<PathBuf>,

    /// Per-target overrides, e.g. `teleroute_framework = "debug"`.
    pub filters: HashMap<String, LogLevel>,

    pub span_events: SpanEventConfig,
    pub thread_ids: bool,

    /// Include file and line number.
    pub file_location: bool,
}

impl LoggingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.output == LogOutput::File && self.file_path.is_none() {
            return Err(ConfigError::invalid(
                "logging.output",
                "\"file\" output needs logging.file_path",
            ));
        }
        if let Some(target) = self.filters.keys().find(|t| t.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "logging.filters",
                format!("empty target {target:?}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(default)]
    struct Section {
        token: String,
        poll_timeout_secs: u64,
    }

    #[test]
    fn test_sections_are_kept_raw() {
        let config: TelerouteConfig = serde_json::from_value(json!({
            "logging": { "level": "debug", "filters": { "teleroute_framework": "trace" } },
            "telegram": { "token": "abc", "poll_timeout_secs": 10 }
        }))
        .unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(
            config.logging.filters.get("teleroute_framework"),
            Some(&LogLevel::Trace)
        );
        assert_eq!(
            config.section::<Section>("telegram").unwrap(),
            Some(Section {
                token: "abc".into(),
                poll_timeout_secs: 10
            })
        );
        assert_eq!(config.section::<Section>("discord").unwrap(), None);
    }

    #[test]
    fn test_malformed_section() {
        let config: TelerouteConfig = serde_json::from_value(json!({
            "telegram": { "token": 7 }
        }))
        .unwrap();

        let err = config.section::<Section>("telegram").unwrap_err();
        assert!(matches!(err, ConfigError::Section { section, .. } if section == "telegram"));
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut logging = LoggingConfig {
            output: LogOutput::File,
            ..Default::default()
        };
        let err = logging.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "logging.output"));

        logging.file_path = Some(PathBuf::from("/var/log/teleroute.log"));
        assert!(logging.validate().is_ok());
    }

    #[test]
    fn test_empty_filter_target() {
        let config: TelerouteConfig = serde_json::from_value(json!({
            "logging": { "filters": { " ": "debug" } }
        }))
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "logging.filters"));
    }
}
