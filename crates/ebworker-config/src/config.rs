//! Main configuration types.
//!
//! This module provides the top-level [`WorkerConfig`] struct and its builder.

use ebworker_core::{MessageMap, MESSAGES_CONFIG_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ConfigError, HeadersConfig, LogFormat, LoggingConfig};

/// Complete worker configuration.
///
/// This is the root configuration type. Use
/// [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use ebworker_config::WorkerConfig;
///
/// let config: WorkerConfig = toml::from_str(r#"
///     [messages]
///     "user.registered" = "SendWelcomeEmail"
///     "order.placed" = ["ReserveStock", "ChargeCard"]
/// "#).unwrap();
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.messages.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Message name to middleware mapping.
    #[serde(default)]
    pub messages: MessageMap,

    /// Queue daemon header names.
    #[serde(default)]
    pub headers: HeadersConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WorkerConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// The dispatch shim checks a mapping only when its message arrives;
    /// this checks every mapping up front.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidMapping` if a mapped value is neither a string
    ///   nor an array of strings
    /// - `ConfigError::InvalidValue` if a header name or the log level is
    ///   invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.messages
            .validate()
            .map_err(|(message_name, err)| ConfigError::invalid_mapping(message_name, err))?;

        self.headers.to_header_names()?;

        ebworker_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty log formatting with ANSI colors at debug level.
    ///
    /// # Example
    ///
    /// ```
    /// use ebworker_config::WorkerConfig;
    ///
    /// let config = WorkerConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON log formatting at info level.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config
    }

    /// Returns the configuration key holding the message mapping.
    #[must_use]
    pub const fn messages_key() -> &'static str {
        MESSAGES_CONFIG_KEY
    }
}

/// Builder for [`WorkerConfig`].
#[derive(Debug, Default)]
pub struct WorkerConfigBuilder {
    messages: MessageMap,
    headers: Option<HeadersConfig>,
    logging: Option<LoggingConfig>,
}

impl WorkerConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a message name to middleware.
    #[must_use]
    pub fn message(mut self, message_name: impl Into<String>, mapped: impl Into<Value>) -> Self {
        self.messages = self.messages.with(message_name, mapped);
        self
    }

    /// Replace the whole message mapping.
    #[must_use]
    pub fn messages(mut self, messages: MessageMap) -> Self {
        self.messages = messages;
        self
    }

    /// Set the header names.
    #[must_use]
    pub fn headers(mut self, headers: HeadersConfig) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> WorkerConfig {
        WorkerConfig {
            messages: self.messages,
            headers: self.headers.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<WorkerConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebworker_core::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = WorkerConfig::default();
        assert!(config.messages.is_empty());
        assert_eq!(config.headers.queue, "x-aws-sqsd-queue");
        assert!(config.logging.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_messages() {
        let config = WorkerConfig::builder()
            .message("user.registered", "SendWelcomeEmail")
            .message("order.placed", json!(["ReserveStock", "ChargeCard"]))
            .build();

        assert_eq!(config.messages.len(), 2);
        assert_eq!(
            config.messages.lookup("order.placed").unwrap().identifiers(),
            ["ReserveStock", "ChargeCard"]
        );
    }

    #[test]
    fn test_validate_invalid_mapping() {
        let result = WorkerConfig::builder()
            .message("ok", json!([]))
            .message("broken", json!({"handler": "Foo"}))
            .build_validated();

        match result.unwrap_err() {
            ConfigError::InvalidMapping {
                message_name,
                source,
            } => {
                assert_eq!(message_name, "broken");
                assert_eq!(source.kind(), ErrorKind::Type);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_invalid_header() {
        let result = WorkerConfig::builder()
            .headers(HeadersConfig {
                queue: "bad header".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("headers.queue"));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let result = WorkerConfig::builder()
            .logging(LoggingConfig {
                level: "ebworker=loud".to_string(),
                ..Default::default()
            })
            .build_validated();

        assert!(result.unwrap_err().to_string().contains("logging.level"));
    }

    #[test]
    fn test_development_preset() {
        let config = WorkerConfig::development();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.ansi_enabled);
    }

    #[test]
    fn test_production_preset() {
        let config = WorkerConfig::production();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.logging.ansi_enabled);
    }

    #[test]
    fn test_messages_key() {
        assert_eq!(WorkerConfig::messages_key(), "messages");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            [messages]
            "message-name" = ["FooMiddleware"]

            [headers]
            queue = "x-queue"

            [logging]
            level = "warn"
        "#;

        let config: WorkerConfig = toml::from_str(toml_str).unwrap();
        assert!(config.messages.lookup("message-name").is_ok());
        assert_eq!(config.headers.queue, "x-queue");
        assert_eq!(config.headers.message_id, "x-aws-sqsd-msgid");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_badly_typed_mapping_still_deserializes() {
        let config: WorkerConfig = toml::from_str(
            r#"
            [messages]
            "message-name" = 10
        "#,
        )
        .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<WorkerConfig, _> = toml::from_str(
            r#"
            [headers]
            queue = "x-queue"
            unknown_field = "value"
        "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let config = WorkerConfig::builder()
            .message("message-name", "FooMiddleware")
            .build();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[messages]"));
        assert!(toml_str.contains("[headers]"));
    }
}
