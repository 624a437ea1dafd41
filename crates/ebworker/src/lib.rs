//! # ebworker
//!
//! **SQS worker dispatch for Elastic Beanstalk worker environments**
//!
//! An Elastic Beanstalk worker environment runs a daemon that pulls messages
//! from an SQS queue and POSTs each one to the application. ebworker turns
//! those deliveries into calls to the middleware mapped to each message name:
//!
//! - **Message mapping** – Message names map to one or more middleware identifiers
//! - **Dispatch attributes** – Queue, message id, name and payload are attached to every delivery
//! - **Periodic tasks** – Scheduled tasks dispatch by the task-name header
//! - **Pluggable resolution** – Identifiers resolve through any [`Resolver`](middleware::Resolver)
//!
//! ## Quick Start
//!
//! ```
//! use ebworker::prelude::*;
//! use serde_json::json;
//!
//! let config = WorkerConfig::builder()
//!     .message("user.registered", "SendWelcomeEmail")
//!     .build();
//!
//! let registry = Registry::new().with(
//!     "SendWelcomeEmail",
//!     FnMiddleware::new("send_welcome_email", |delivery, response, next| {
//!         let _user = delivery.message_payload();
//!         next.run(delivery, response)
//!     }),
//! );
//!
//! let worker = ebworker::worker_from_config(&config, registry).unwrap();
//! # let _ = worker;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Delivery → WorkerMiddleware → mapped 1 → … → mapped N → next
//!                                                          ↓
//! Response ←───────────────────────────────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/ebworker/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use ebworker_core as core;

// Re-export middleware types
pub use ebworker_middleware as middleware;

// Re-export configuration types
pub use ebworker_config as config;

// Re-export telemetry types
pub use ebworker_telemetry as telemetry;

use ebworker_config::{ConfigError, WorkerConfig};
use ebworker_middleware::{Resolver, WorkerMiddleware};
use ebworker_telemetry::{LogConfig, TelemetryResult};

/// Builds a worker middleware from a loaded configuration.
///
/// Every mapping is validated up front and the configured header names are
/// applied.
///
/// # Errors
///
/// Returns `ConfigError` if the configuration does not validate.
pub fn worker_from_config(
    config: &WorkerConfig,
    resolver: impl Resolver + 'static,
) -> Result<WorkerMiddleware, ConfigError> {
    config.validate()?;
    let headers = config.headers.to_header_names()?;

    Ok(WorkerMiddleware::new(config.messages.clone(), resolver).with_headers(headers))
}

/// Installs the global log subscriber described by the `logging` section.
///
/// # Errors
///
/// Returns `TelemetryError` if a subscriber is already installed or the level
/// is invalid.
pub fn init_logging(config: &WorkerConfig) -> TelemetryResult<()> {
    ebworker_telemetry::init_logging(&LogConfig::from(&config.logging))
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use ebworker::prelude::*;
/// ```
pub mod prelude {
    pub use ebworker_core::{
        Delivery, DeliveryExt, ErrorKind, MessageMap, MiddlewareList, Response, WorkerError,
        WorkerResult,
    };

    pub use ebworker_middleware::{
        BoxedMiddleware, FnMiddleware, Middleware, Next, Registry, Resolver, WorkerMiddleware,
    };

    pub use ebworker_config::{ConfigError, ConfigLoader, WorkerConfig};

    pub use crate::worker_from_config;
}
