//! Delivery and response types.
//!
//! The queue daemon turns every dequeued message into an HTTP `POST`. Inside
//! ebworker such a request is called a [`Delivery`]; its body is a JSON
//! [`MessageEnvelope`] and its headers identify the originating queue and the
//! message id.

use bytes::Bytes;
use http::HeaderName;
use serde::{Deserialize, Serialize};

/// A single delivered message, as received from the queue daemon.
pub type Delivery = http::Request<Bytes>;

/// The response type flowing through the worker chain.
pub type Response = http::Response<Bytes>;

/// Default header carrying the originating queue name.
pub const QUEUE_HEADER: &str = "x-aws-sqsd-queue";

/// Default header carrying the unique message id.
pub const MESSAGE_ID_HEADER: &str = "x-aws-sqsd-msgid";

/// Default header carrying the task name of a periodic task.
pub const TASK_NAME_HEADER: &str = "x-aws-sqsd-taskname";

/// Names of the headers set by the queue daemon.
///
/// # Example
///
/// ```
/// use ebworker_core::HeaderNames;
///
/// let names = HeaderNames::default();
/// assert_eq!(names.queue.as_str(), "x-aws-sqsd-queue");
/// assert_eq!(names.message_id.as_str(), "x-aws-sqsd-msgid");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNames {
    /// Header identifying the originating queue.
    pub queue: HeaderName,
    /// Header identifying the message id.
    pub message_id: HeaderName,
    /// Header naming a periodic task. Its presence replaces body parsing.
    pub task_name: HeaderName,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            queue: HeaderName::from_static(QUEUE_HEADER),
            message_id: HeaderName::from_static(MESSAGE_ID_HEADER),
            task_name: HeaderName::from_static(TASK_NAME_HEADER),
        }
    }
}

impl HeaderNames {
    /// Reads a header as a string.
    ///
    /// A missing header yields an empty string; non UTF-8 bytes are replaced.
    #[must_use]
    pub fn read(delivery: &Delivery, name: &HeaderName) -> String {
        delivery
            .headers()
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default()
    }

    /// Returns the periodic task name, if the delivery carries one.
    #[must_use]
    pub fn task_name_of(&self, delivery: &Delivery) -> Option<String> {
        delivery
            .headers()
            .get(&self.task_name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .filter(|name| !name.is_empty())
    }
}

/// The JSON body of a delivery.
///
/// Only the two top-level fields are interpreted; the payload is kept as an
/// arbitrary JSON value.
///
/// # Example
///
/// ```
/// use ebworker_core::MessageEnvelope;
///
/// let envelope = MessageEnvelope::from_body(br#"{"name":"user.registered","payload":{"id":1}}"#).unwrap();
/// assert_eq!(envelope.name, "user.registered");
/// assert_eq!(envelope.payload["id"], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// The message name, used as the mapping key.
    pub name: String,

    /// The message payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl MessageEnvelope {
    /// Creates a new envelope.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Decodes an envelope from a delivery body.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Encodes the envelope as a delivery body.
    pub fn to_body(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}
