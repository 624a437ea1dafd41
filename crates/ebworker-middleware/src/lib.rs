//! # ebworker Middleware
//!
//! Dispatches queue daemon deliveries to the middleware mapped to their
//! message name.
//!
//! An Elastic Beanstalk worker environment runs a daemon that polls an SQS
//! queue and POSTs every message to the application. The body is a JSON
//! envelope `{"name": ..., "payload": ...}`. [`WorkerMiddleware`] reads the
//! envelope, looks the name up in a [`MessageMap`](ebworker_core::MessageMap),
//! attaches the dispatch attributes to the delivery and runs the mapped
//! middleware in order before handing control back to its own `next`.
//!
//! ## Dispatch Chain
//!
//! ```text
//! Delivery → WorkerMiddleware → mapped 1 → … → mapped N → next
//!                                                          ↓
//! Response ←───────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use ebworker_core::{DeliveryExt, MessageMap};
//! use ebworker_middleware::{FnMiddleware, Registry, WorkerMiddleware};
//! use serde_json::json;
//!
//! let registry = Registry::new().with(
//!     "SendWelcomeEmail",
//!     FnMiddleware::new("send_welcome_email", |delivery, response, next| {
//!         assert_eq!(delivery.message_name(), Some("user.registered"));
//!         next.run(delivery, response)
//!     }),
//! );
//!
//! let worker = WorkerMiddleware::new(
//!     MessageMap::new().with("user.registered", json!("SendWelcomeEmail")),
//!     registry,
//! );
//!
//! let delivery = http::Request::builder()
//!     .method("POST")
//!     .header("x-aws-sqsd-queue", "default")
//!     .header("x-aws-sqsd-msgid", "42")
//!     .body(Bytes::from_static(br#"{"name":"user.registered","payload":{"id":7}}"#))
//!     .unwrap();
//!
//! let response = worker.dispatch(delivery, http::Response::new(Bytes::new())).unwrap();
//! assert_eq!(response.status(), 200);
//! ```

#![doc(html_root_url = "https://docs.rs/ebworker-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod middleware;
pub mod resolver;
pub mod worker;

// Re-export main types at crate root
pub use middleware::{FnMiddleware, Middleware, Next};
pub use resolver::{BoxedMiddleware, Registry, Resolver};
pub use worker::WorkerMiddleware;
