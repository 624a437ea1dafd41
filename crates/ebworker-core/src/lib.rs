//! # ebworker Core
//!
//! Core types shared by the ebworker crates:
//!
//! - [`Delivery`] / [`Response`] - The HTTP request and response flowing through the worker chain
//! - [`MessageEnvelope`] - The JSON body of a delivered message
//! - [`HeaderNames`] - Headers set by the queue daemon
//! - [`DeliveryExt`] - Attribute access, including the four dispatch attributes
//! - [`MessageMap`] / [`MiddlewareList`] - Message name → middleware mapping
//! - [`WorkerError`] - Standard error type

#![doc(html_root_url = "https://docs.rs/ebworker-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod attributes;
mod delivery;
mod error;
mod mapping;

pub use attributes::{
    is_reserved, with_dispatch_attributes, DeliveryExt, DispatchAttributes,
    MATCHED_QUEUE_ATTRIBUTE, MESSAGE_ID_ATTRIBUTE, MESSAGE_NAME_ATTRIBUTE,
    MESSAGE_PAYLOAD_ATTRIBUTE, RESERVED_ATTRIBUTES,
};
pub use delivery::{
    Delivery, HeaderNames, MessageEnvelope, Response, MESSAGE_ID_HEADER, QUEUE_HEADER,
    TASK_NAME_HEADER,
};
pub use error::{ErrorKind, WorkerError, WorkerResult, MESSAGES_CONFIG_KEY};
pub use mapping::{kind_of, MessageMap, MiddlewareList};
