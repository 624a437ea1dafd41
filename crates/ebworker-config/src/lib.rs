//! Typed configuration for ebworker.
//!
//! This crate loads the worker configuration with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`WorkerConfig`] holds three sections:
//!
//! - `messages` - Message name to middleware mapping
//! - [`HeadersConfig`] - Names of the headers set by the queue daemon
//! - [`LoggingConfig`] - Logging settings
//!
//! # Example
//!
//! ```no_run
//! use ebworker_config::{ConfigLoader, ConfigError};
//!
//! # fn main() -> Result<(), ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("worker.toml")?
//!     .with_env_prefix("EBWORKER")
//!     .load()?;
//!
//! println!("{} messages mapped", config.messages.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [messages]
//! "user.registered" = "SendWelcomeEmail"
//! "order.placed" = ["ReserveStock", "ChargeCard"]
//! "cache.warmup" = []
//!
//! [headers]
//! queue = "x-aws-sqsd-queue"
//! message_id = "x-aws-sqsd-msgid"
//! task_name = "x-aws-sqsd-taskname"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! The `headers` and `logging` sections can be overridden via environment
//! variables using the format `PREFIX__SECTION__KEY`. For example:
//!
//! - `EBWORKER__HEADERS__QUEUE=x-queue`
//! - `EBWORKER__LOGGING__LEVEL=debug`
//! - `EBWORKER__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/ebworker-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{WorkerConfig, WorkerConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{HeadersConfig, LogFormat, LoggingConfig};
