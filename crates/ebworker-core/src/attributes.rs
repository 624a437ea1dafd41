//! Delivery attributes.
//!
//! Attributes are named JSON values carried in the extensions of a
//! [`Delivery`]. The dispatch shim attaches four of them before any mapped
//! middleware runs:
//!
//! | Constant | Key | Source |
//! |---|---|---|
//! | [`MATCHED_QUEUE_ATTRIBUTE`] | `worker.matched_queue` | queue header |
//! | [`MESSAGE_ID_ATTRIBUTE`] | `worker.message_id` | message id header |
//! | [`MESSAGE_NAME_ATTRIBUTE`] | `worker.message_name` | body `name` |
//! | [`MESSAGE_PAYLOAD_ATTRIBUTE`] | `worker.message_payload` | body `payload` |
//!
//! These four keys are reserved: [`DeliveryExt::with_attribute`] refuses to
//! overwrite them, so every middleware in the chain and the terminal
//! continuation observe the values set by the shim.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::delivery::Delivery;
use crate::error::{WorkerError, WorkerResult};

/// Attribute holding the originating queue name.
pub const MATCHED_QUEUE_ATTRIBUTE: &str = "worker.matched_queue";

/// Attribute holding the message id.
pub const MESSAGE_ID_ATTRIBUTE: &str = "worker.message_id";

/// Attribute holding the message name.
pub const MESSAGE_NAME_ATTRIBUTE: &str = "worker.message_name";

/// Attribute holding the message payload.
pub const MESSAGE_PAYLOAD_ATTRIBUTE: &str = "worker.message_payload";

/// The attribute keys reserved for dispatch metadata.
pub const RESERVED_ATTRIBUTES: [&str; 4] = [
    MATCHED_QUEUE_ATTRIBUTE,
    MESSAGE_ID_ATTRIBUTE,
    MESSAGE_NAME_ATTRIBUTE,
    MESSAGE_PAYLOAD_ATTRIBUTE,
];

/// Returns `true` if `name` is one of the dispatch attribute keys.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    RESERVED_ATTRIBUTES.contains(&name)
}

/// Attribute storage inside the request extensions.
#[derive(Debug, Clone, Default)]
struct Attributes(BTreeMap<String, Value>);

/// The four values attached to a delivery for one dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchAttributes {
    /// The originating queue name.
    pub matched_queue: String,
    /// The message id assigned by the queue.
    pub message_id: String,
    /// The message name.
    pub message_name: String,
    /// The message payload.
    pub message_payload: Value,
}

/// Returns `delivery` enriched with the four dispatch attributes.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use ebworker_core::{with_dispatch_attributes, DeliveryExt, DispatchAttributes};
/// use serde_json::json;
///
/// let delivery = http::Request::new(Bytes::new());
/// let delivery = with_dispatch_attributes(
///     delivery,
///     DispatchAttributes {
///         matched_queue: "default-queue".to_string(),
///         message_id: "123abc".to_string(),
///         message_name: "message-name".to_string(),
///         message_payload: json!({"id": 123}),
///     },
/// );
///
/// assert_eq!(delivery.matched_queue(), Some("default-queue"));
/// assert_eq!(delivery.message_payload(), Some(&json!({"id": 123})));
/// ```
#[must_use]
pub fn with_dispatch_attributes(mut delivery: Delivery, attributes: DispatchAttributes) -> Delivery {
    let bag = delivery
        .extensions_mut()
        .get_or_insert_default::<Attributes>();

    bag.0.insert(
        MATCHED_QUEUE_ATTRIBUTE.to_string(),
        Value::String(attributes.matched_queue),
    );
    bag.0.insert(
        MESSAGE_ID_ATTRIBUTE.to_string(),
        Value::String(attributes.message_id),
    );
    bag.0.insert(
        MESSAGE_NAME_ATTRIBUTE.to_string(),
        Value::String(attributes.message_name),
    );
    bag.0.insert(
        MESSAGE_PAYLOAD_ATTRIBUTE.to_string(),
        attributes.message_payload,
    );

    delivery
}

/// Attribute access on a [`Delivery`].
pub trait DeliveryExt: Sized {
    /// Returns the attribute stored under `name`.
    fn attribute(&self, name: &str) -> Option<&Value>;

    /// Returns a delivery carrying `value` under `name`.
    ///
    /// Fails with [`WorkerError::ReservedAttribute`] for the four dispatch keys.
    fn with_attribute(self, name: impl Into<String>, value: impl Into<Value>) -> WorkerResult<Self>;

    /// Returns the matched queue name.
    fn matched_queue(&self) -> Option<&str> {
        self.attribute(MATCHED_QUEUE_ATTRIBUTE).and_then(Value::as_str)
    }

    /// Returns the message id.
    fn message_id(&self) -> Option<&str> {
        self.attribute(MESSAGE_ID_ATTRIBUTE).and_then(Value::as_str)
    }

    /// Returns the message name.
    fn message_name(&self) -> Option<&str> {
        self.attribute(MESSAGE_NAME_ATTRIBUTE).and_then(Value::as_str)
    }

    /// Returns the message payload.
    fn message_payload(&self) -> Option<&Value> {
        self.attribute(MESSAGE_PAYLOAD_ATTRIBUTE)
    }

    /// Returns all four dispatch attributes, if the delivery was dispatched.
    fn dispatch_attributes(&self) -> Option<DispatchAttributes> {
        Some(DispatchAttributes {
            matched_queue: self.matched_queue()?.to_string(),
            message_id: self.message_id()?.to_string(),
            message_name: self.message_name()?.to_string(),
            message_payload: self.message_payload()?.clone(),
        })
    }
}

impl DeliveryExt for Delivery {
    fn attribute(&self, name: &str) -> Option<&Value> {
        self.extensions()
            .get::<Attributes>()
            .and_then(|bag| bag.0.get(name))
    }

    fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> WorkerResult<Self> {
        let name = name.into();
        if is_reserved(&name) {
            return Err(WorkerError::reserved_attribute(name));
        }

        self.extensions_mut()
            .get_or_insert_default::<Attributes>()
            .0
            .insert(name, value.into());
        Ok(self)
    }
}
