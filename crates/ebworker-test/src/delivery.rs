//! Test delivery building.

use crate::error::TestError;
use bytes::Bytes;
use ebworker_core::{
    Delivery, MessageEnvelope, Response, MESSAGE_ID_HEADER, QUEUE_HEADER, TASK_NAME_HEADER,
};
use http::{header, HeaderName, HeaderValue, Method, StatusCode};
use serde_json::Value;

/// Entry point for building deliveries as the queue daemon would send them.
pub struct TestDelivery;

impl TestDelivery {
    /// Creates a builder for a POST delivery to `/`.
    pub fn builder() -> TestDeliveryBuilder {
        TestDeliveryBuilder::new()
    }

    /// Creates a builder carrying the message `name` with `payload`.
    pub fn message(name: impl Into<String>, payload: Value) -> TestDeliveryBuilder {
        TestDeliveryBuilder::new().message(name, payload)
    }

    /// Creates an empty `200 OK` response to seed a dispatch with.
    #[must_use]
    pub fn response() -> Response {
        let mut response = Response::new(Bytes::new());
        *response.status_mut() = StatusCode::OK;
        response
    }
}

/// Builder for constructing test deliveries.
#[must_use]
pub struct TestDeliveryBuilder {
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
    envelope: Option<MessageEnvelope>,
}

impl Default for TestDeliveryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDeliveryBuilder {
    /// Creates a new delivery builder.
    pub fn new() -> Self {
        Self {
            uri: "/".to_string(),
            headers: Vec::new(),
            body: None,
            envelope: None,
        }
    }

    /// Sets the request path the daemon posts to.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Sets the queue header.
    pub fn queue(self, queue: impl Into<String>) -> Self {
        self.header(QUEUE_HEADER, queue)
    }

    /// Sets the message id header.
    pub fn message_id(self, message_id: impl Into<String>) -> Self {
        self.header(MESSAGE_ID_HEADER, message_id)
    }

    /// Sets the periodic task header.
    pub fn task_name(self, task_name: impl Into<String>) -> Self {
        self.header(TASK_NAME_HEADER, task_name)
    }

    /// Sets the body to a message envelope.
    ///
    /// This also sets the `Content-Type` header to `application/json`.
    pub fn message(mut self, name: impl Into<String>, payload: Value) -> Self {
        self.envelope = Some(MessageEnvelope::new(name, payload));
        self.body = None;
        self
    }

    /// Sets the raw body, replacing any message envelope.
    pub fn raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self.envelope = None;
        self
    }

    /// Sets a header. Later values for the same name replace earlier ones.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds the delivery.
    ///
    /// # Errors
    ///
    /// Returns `TestError` if a header or the URI is invalid, or the envelope
    /// cannot be serialized.
    pub fn build(self) -> Result<Delivery, TestError> {
        let mut builder = http::Request::builder().method(Method::POST).uri(&self.uri);

        let headers = builder
            .headers_mut()
            .ok_or_else(|| TestError::DeliveryBuild(format!("Invalid URI: {}", self.uri)))?;

        for (name, value) in &self.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }

        let body = match (self.envelope, self.body) {
            (Some(envelope), _) => {
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                envelope.to_body()?
            }
            (None, Some(body)) => body,
            (None, None) => Bytes::new(),
        };

        builder
            .body(body)
            .map_err(|e| TestError::DeliveryBuild(e.to_string()))
    }
}
