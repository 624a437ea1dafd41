//! Configuration schema types.
//!
//! This module defines the structure of the `headers` and `logging` sections.

use ebworker_core::{HeaderNames, MESSAGE_ID_HEADER, QUEUE_HEADER, TASK_NAME_HEADER};
use http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Queue daemon header names.
///
/// The defaults match the headers set by the Elastic Beanstalk worker daemon.
///
/// # Example
///
/// ```
/// use ebworker_config::HeadersConfig;
///
/// let headers = HeadersConfig::default().to_header_names().unwrap();
/// assert_eq!(headers.queue.as_str(), "x-aws-sqsd-queue");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HeadersConfig {
    /// Header identifying the originating queue.
    #[serde(default = "default_queue_header")]
    pub queue: String,

    /// Header identifying the message id.
    #[serde(default = "default_message_id_header")]
    pub message_id: String,

    /// Header naming a periodic task.
    #[serde(default = "default_task_name_header")]
    pub task_name: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            queue: default_queue_header(),
            message_id: default_message_id_header(),
            task_name: default_task_name_header(),
        }
    }
}

impl HeadersConfig {
    /// Converts the configured names into HTTP header names.
    ///
    /// Names are case-insensitive and normalised to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a name is not a valid HTTP
    /// header name.
    pub fn to_header_names(&self) -> Result<HeaderNames, ConfigError> {
        Ok(HeaderNames {
            queue: parse_header_name("headers.queue", &self.queue)?,
            message_id: parse_header_name("headers.message_id", &self.message_id)?,
            task_name: parse_header_name("headers.task_name", &self.task_name)?,
        })
    }
}

fn parse_header_name(field: &str, value: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(value.as_bytes()).map_err(|_| {
        ConfigError::invalid_value(field, format!("invalid HTTP header name: {value:?}"))
    })
}

fn default_queue_header() -> String {
    QUEUE_HEADER.to_string()
}

fn default_message_id_header() -> String {
    MESSAGE_ID_HEADER.to_string()
}

fn default_task_name_header() -> String {
    TASK_NAME_HEADER.to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
    /// Human-readable single-line format.
    Compact,
}

impl From<LogFormat> for ebworker_telemetry::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (e.g. "info", "ebworker_middleware=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl From<&LoggingConfig> for ebworker_telemetry::LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            format: config.format.into(),
            ansi_enabled: config.ansi_enabled,
            file_line_info: config.include_location,
            include_target: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_true() -> bool {
    true
}
