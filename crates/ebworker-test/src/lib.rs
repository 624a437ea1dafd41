//! # ebworker Test
//!
//! Test utilities for ebworker: deliveries built the way the queue daemon
//! sends them, and fixtures for observing a dispatch.
//!
//! ## Key Features
//!
//! - **Delivery Builder**: Fluent API for message and periodic-task deliveries
//! - **Recording Resolver**: Records every identifier resolved
//! - **Counting Middleware**: Increments a `counter` attribute and header
//! - **Terminal Probe**: Captures what reaches the end of the chain
//!
//! ## Example
//!
//! ```
//! use ebworker_core::MessageMap;
//! use ebworker_middleware::{Middleware, WorkerMiddleware};
//! use ebworker_test::{CountingMiddleware, RecordingResolver, TerminalProbe, TestDelivery};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let resolver = Arc::new(
//!     RecordingResolver::new()
//!         .with("FooMiddleware", CountingMiddleware::new())
//!         .with("BarMiddleware", CountingMiddleware::new()),
//! );
//! let worker = WorkerMiddleware::new(
//!     MessageMap::new().with("message-name", json!(["FooMiddleware", "BarMiddleware"])),
//!     Arc::clone(&resolver),
//! );
//!
//! let delivery = TestDelivery::message("message-name", json!({"id": 123}))
//!     .queue("default-queue")
//!     .message_id("123abc")
//!     .build()
//!     .unwrap();
//!
//! let probe = TerminalProbe::new();
//! let response = worker
//!     .process(delivery, TestDelivery::response(), probe.terminal())
//!     .unwrap();
//!
//! assert_eq!(CountingMiddleware::header_count_of(&response), Some(2));
//! assert_eq!(resolver.requested(), ["FooMiddleware", "BarMiddleware"]);
//! ```

#![doc(html_root_url = "https://docs.rs/ebworker-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod delivery;
mod error;
mod fixtures;
mod resolver;

pub use delivery::{TestDelivery, TestDeliveryBuilder};
pub use error::TestError;
pub use fixtures::{CountingMiddleware, TerminalProbe, COUNTER};
pub use resolver::RecordingResolver;
