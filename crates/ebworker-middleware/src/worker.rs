//! The worker dispatch middleware.
//!
//! [`WorkerMiddleware`] sits in the host's middleware chain and routes every
//! delivery from the queue daemon to the middleware mapped to its message
//! name.
//!
//! ## Dispatch
//!
//! ```text
//! Delivery → decode body → lookup name → normalise → attach attributes
//!                                                          ↓
//! Response ← next ← mapped N ← … ← mapped 1 ← resolve identifiers
//! ```
//!
//! 1. Decode the body into a [`MessageEnvelope`] (or, for a periodic task,
//!    take the name from the task-name header)
//! 2. Look up the mapped middleware for the message name
//! 3. Attach the four dispatch attributes to the delivery
//! 4. Resolve every identifier through the [`Resolver`]
//! 5. Run the mapped middleware in order, ending in the caller's `next`
//!
//! A missing mapping or a badly typed mapping fails before anything runs.
//! Errors from decoding, resolution and the chain itself are returned as
//! they were raised.

use std::fmt;
use std::time::Instant;

use ebworker_core::{
    with_dispatch_attributes, Delivery, DispatchAttributes, ErrorKind, HeaderNames,
    MessageEnvelope, MessageMap, Response, WorkerResult,
};
use ebworker_telemetry::metrics::{record_dispatch, DispatchOutcome};
use serde_json::Value;
use tracing::{debug, warn};

use crate::middleware::{Middleware, Next};
use crate::resolver::{BoxedMiddleware, Resolver};

/// Routes deliveries to the middleware mapped to their message name.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use ebworker_core::MessageMap;
/// use ebworker_middleware::{Registry, WorkerMiddleware};
/// use serde_json::json;
///
/// let worker = WorkerMiddleware::new(
///     MessageMap::new().with("message-name", json!([])),
///     Registry::new(),
/// );
///
/// let delivery = http::Request::builder()
///     .method("POST")
///     .header("x-aws-sqsd-queue", "default-queue")
///     .header("x-aws-sqsd-msgid", "123abc")
///     .body(Bytes::from_static(br#"{"name":"message-name","payload":{"id":123}}"#))
///     .unwrap();
///
/// let response = worker.dispatch(delivery, http::Response::new(Bytes::new())).unwrap();
/// assert_eq!(response.status(), 200);
/// ```
pub struct WorkerMiddleware {
    messages: MessageMap,
    resolver: Box<dyn Resolver>,
    headers: HeaderNames,
}

impl WorkerMiddleware {
    /// Creates a worker middleware.
    ///
    /// Mapped values are not validated here; each dispatch validates the entry
    /// of the message it handles.
    pub fn new(messages: MessageMap, resolver: impl Resolver + 'static) -> Self {
        Self {
            messages,
            resolver: Box::new(resolver),
            headers: HeaderNames::default(),
        }
    }

    /// Uses custom queue daemon header names.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderNames) -> Self {
        self.headers = headers;
        self
    }

    /// Returns the message mapping.
    #[must_use]
    pub fn messages(&self) -> &MessageMap {
        &self.messages
    }

    /// Returns the header names read from deliveries.
    #[must_use]
    pub fn headers(&self) -> &HeaderNames {
        &self.headers
    }

    /// Dispatches a delivery with a pass-through terminal continuation.
    ///
    /// With no mapped middleware touching it, the seed response is returned.
    pub fn dispatch(&self, delivery: Delivery, response: Response) -> WorkerResult<Response> {
        self.process(delivery, response, Next::passthrough())
    }

    // Periodic tasks carry their name in a header and have no message body.
    fn read_message(&self, delivery: &Delivery) -> WorkerResult<(String, Value)> {
        if let Some(task_name) = self.headers.task_name_of(delivery) {
            return Ok((task_name, Value::Null));
        }

        let envelope = MessageEnvelope::from_body(delivery.body())?;
        Ok((envelope.name, envelope.payload))
    }

    fn resolve_all(&self, identifiers: &[String]) -> WorkerResult<Vec<BoxedMiddleware>> {
        identifiers
            .iter()
            .map(|identifier| self.resolver.resolve(identifier))
            .collect()
    }
}

impl Middleware for WorkerMiddleware {
    fn name(&self) -> &str {
        "worker"
    }

    fn process(&self, delivery: Delivery, response: Response, next: Next<'_>) -> WorkerResult<Response> {
        let started = Instant::now();
        let mut message_name = None;

        let result = self.route(delivery, response, next, &mut message_name);

        let outcome = outcome_of(&result);
        let label = message_name.as_deref().unwrap_or(UNKNOWN_MESSAGE);
        if let Err(err) = &result {
            warn!(message_name = %label, outcome = %outcome, error = %err, "Dispatch did not complete");
        }
        record_dispatch(label, outcome, started.elapsed());

        result
    }
}

impl WorkerMiddleware {
    // `message_name` is filled in as soon as the delivery has been read, so
    // every exit can be labelled with it.
    fn route(
        &self,
        delivery: Delivery,
        response: Response,
        next: Next<'_>,
        message_name: &mut Option<String>,
    ) -> WorkerResult<Response> {
        let (name, message_payload) = self.read_message(&delivery)?;
        *message_name = Some(name.clone());

        let mapped = self.messages.lookup(&name)?;

        let attributes = DispatchAttributes {
            matched_queue: HeaderNames::read(&delivery, &self.headers.queue),
            message_id: HeaderNames::read(&delivery, &self.headers.message_id),
            message_name: name,
            message_payload,
        };

        debug!(
            queue = %attributes.matched_queue,
            message_id = %attributes.message_id,
            message_name = %attributes.message_name,
            middleware_count = mapped.len(),
            "Dispatching delivery"
        );

        let delivery = with_dispatch_attributes(delivery, attributes);

        let middlewares = self.resolve_all(mapped.identifiers())?;
        let chain = Next::chain(
            middlewares
                .iter()
                .map(|middleware| -> &dyn Middleware { &**middleware }),
            next,
        );
        chain.run(delivery, response)
    }
}

// Metrics label used when the message name could not be read.
const UNKNOWN_MESSAGE: &str = "unknown";

// Routing failures (unreadable body, missing or badly typed mapping) are
// rejections; anything raised once the chain is being built is a failure.
fn outcome_of(result: &WorkerResult<Response>) -> DispatchOutcome {
    match result {
        Ok(_) => DispatchOutcome::Completed,
        Err(err) => match err.kind() {
            ErrorKind::Decode | ErrorKind::Configuration | ErrorKind::Type => {
                DispatchOutcome::Rejected
            }
            ErrorKind::Attribute | ErrorKind::Resolution | ErrorKind::Handler => {
                DispatchOutcome::Failed
            }
        },
    }
}

impl fmt::Debug for WorkerMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerMiddleware")
            .field("messages", &self.messages.len())
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Registry;
    use bytes::Bytes;
    use ebworker_core::{DeliveryExt, WorkerError};
    use http::StatusCode;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::json;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn delivery(body: &'static str) -> Delivery {
        http::Request::builder()
            .method("POST")
            .uri("/")
            .header("X-Aws-Sqsd-Queue", "default-queue")
            .header("X-Aws-Sqsd-Msgid", "123abc")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    fn message_delivery() -> Delivery {
        delivery(r#"{"name":"message-name","payload":{"id":123}}"#)
    }

    fn seed_response() -> Response {
        http::Response::builder()
            .status(StatusCode::OK)
            .body(Bytes::from_static(b"seed"))
            .unwrap()
    }

    struct Marker(&'static str);

    impl Middleware for Marker {
        fn name(&self) -> &str {
            self.0
        }

        fn process(&self, delivery: Delivery, mut response: Response, next: Next<'_>) -> WorkerResult<Response> {
            response
                .headers_mut()
                .append("x-visited", self.0.parse::<http::HeaderValue>().map_err(WorkerError::handler)?);
            next.run(delivery, response)
        }
    }

    #[test]
    fn test_name() {
        let worker = WorkerMiddleware::new(MessageMap::new(), Registry::new());
        assert_eq!(worker.name(), "worker");
    }

    #[test]
    fn test_missing_mapping_does_not_call_next() {
        let worker = WorkerMiddleware::new(MessageMap::new(), Registry::new());
        let called = Cell::new(false);

        let err = worker
            .process(
                message_delivery(),
                seed_response(),
                Next::terminal(|_, response| {
                    called.set(true);
                    Ok(response)
                }),
            )
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("\"message-name\""));
        assert!(!called.get());
    }

    #[test]
    fn test_invalid_mapped_type_does_not_resolve() {
        let resolutions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&resolutions);
        let resolver = move |identifier: &str| -> WorkerResult<BoxedMiddleware> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(WorkerError::unresolved(identifier, "unexpected"))
        };

        let worker = WorkerMiddleware::new(
            MessageMap::new().with("message-name", json!(10)),
            resolver,
        );

        let err = worker.dispatch(message_delivery(), seed_response()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(err.to_string().contains("integer given"));
        assert_eq!(resolutions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_mapping_returns_seed_response() {
        let worker = WorkerMiddleware::new(
            MessageMap::new().with("message-name", json!([])),
            Registry::new(),
        );

        let seed = seed_response();
        let seed_ptr = seed.body().as_ptr();

        let response = worker.dispatch(message_delivery(), seed).unwrap();
        assert_eq!(response.body().as_ptr(), seed_ptr);
        assert_eq!(response.body(), "seed");
    }

    #[test]
    fn test_mapped_middleware_run_in_order() {
        let registry = Registry::new()
            .with("FooMiddleware", Marker("foo"))
            .with("BarMiddleware", Marker("bar"));
        let worker = WorkerMiddleware::new(
            MessageMap::new().with("message-name", json!(["FooMiddleware", "BarMiddleware"])),
            registry,
        );

        let response = worker.dispatch(message_delivery(), seed_response()).unwrap();
        let visited: Vec<_> = response
            .headers()
            .get_all("x-visited")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(visited, ["foo", "bar"]);
    }

    #[test]
    fn test_attributes_visible_to_terminal() {
        let worker = WorkerMiddleware::new(
            MessageMap::new().with("message-name", json!("FooMiddleware")),
            Registry::new().with("FooMiddleware", Marker("foo")),
        );
        let seen = Cell::new(None);

        worker
            .process(
                message_delivery(),
                seed_response(),
                Next::terminal(|delivery: Delivery, response| {
                    seen.set(delivery.dispatch_attributes());
                    Ok(response)
                }),
            )
            .unwrap();

        let attributes = seen.take().unwrap();
        assert_eq!(attributes.matched_queue, "default-queue");
        assert_eq!(attributes.message_id, "123abc");
        assert_eq!(attributes.message_name, "message-name");
        assert_eq!(attributes.message_payload, json!({"id": 123}));
    }

    #[test]
    fn test_resolution_error_propagates() {
        let worker = WorkerMiddleware::new(
            MessageMap::new().with("message-name", json!(["FooMiddleware"])),
            Registry::new(),
        );

        let err = worker.dispatch(message_delivery(), seed_response()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[test]
    fn test_malformed_body_propagates_decode_error() {
        let worker = WorkerMiddleware::new(
            MessageMap::new().with("message-name", json!([])),
            Registry::new(),
        );

        let err = worker.dispatch(delivery("not json"), seed_response()).unwrap_err();
        assert!(matches!(err, WorkerError::Decode(_)));
    }

    #[test]
    fn test_every_exit_is_recorded() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let worker = WorkerMiddleware::new(
            MessageMap::new()
                .with("message-name", json!(["MissingMiddleware"]))
                .with("bad-type", json!(10)),
            Registry::new(),
        );

        metrics::with_local_recorder(&recorder, || {
            let unresolved = worker.dispatch(message_delivery(), seed_response());
            assert!(unresolved.is_err());

            let malformed = worker.dispatch(delivery("not json"), seed_response());
            assert!(malformed.is_err());

            let bad_type = worker.dispatch(
                delivery(r#"{"name":"bad-type","payload":null}"#),
                seed_response(),
            );
            assert!(bad_type.is_err());
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"message="message-name",outcome="failed""#));
        assert!(rendered.contains(r#"message="unknown",outcome="rejected""#));
        assert!(rendered.contains(r#"message="bad-type",outcome="rejected""#));
        assert!(rendered.contains("ebworker_dispatch_duration_seconds"));
    }

    #[test]
    fn test_outcome_of_classifies_errors() {
        assert_eq!(outcome_of(&Ok(seed_response())), DispatchOutcome::Completed);
        assert_eq!(
            outcome_of(&Err(WorkerError::missing_mapping("message-name"))),
            DispatchOutcome::Rejected
        );
        assert_eq!(
            outcome_of(&Err(WorkerError::unresolved("FooMiddleware", "not registered"))),
            DispatchOutcome::Failed
        );
        assert_eq!(
            outcome_of(&Err(WorkerError::handler(anyhow::anyhow!("boom")))),
            DispatchOutcome::Failed
        );
    }

    #[test]
    fn test_periodic_task_uses_task_name_header() {
        let worker = WorkerMiddleware::new(
            MessageMap::new().with("nightly-report", json!([])),
            Registry::new(),
        );
        let seen = Cell::new(None);

        let task = http::Request::builder()
            .method("POST")
            .header("x-aws-sqsd-taskname", "nightly-report")
            .header("x-aws-sqsd-msgid", "task-1")
            .body(Bytes::new())
            .unwrap();

        worker
            .process(
                task,
                seed_response(),
                Next::terminal(|delivery: Delivery, response| {
                    seen.set(delivery.dispatch_attributes());
                    Ok(response)
                }),
            )
            .unwrap();

        let attributes = seen.take().unwrap();
        assert_eq!(attributes.message_name, "nightly-report");
        assert_eq!(attributes.message_id, "task-1");
        assert_eq!(attributes.matched_queue, "");
        assert!(attributes.message_payload.is_null());
    }

    #[test]
    fn test_custom_header_names() {
        let headers = HeaderNames {
            queue: http::HeaderName::from_static("x-queue"),
            message_id: http::HeaderName::from_static("x-message-id"),
            task_name: http::HeaderName::from_static("x-task"),
        };
        let worker = WorkerMiddleware::new(
            MessageMap::new().with("message-name", json!([])),
            Registry::new(),
        )
        .with_headers(headers);
        let seen = Cell::new(None);

        let custom = http::Request::builder()
            .method("POST")
            .header("x-queue", "jobs")
            .header("x-message-id", "m-1")
            .body(Bytes::from_static(br#"{"name":"message-name","payload":null}"#))
            .unwrap();

        worker
            .process(
                custom,
                seed_response(),
                Next::terminal(|delivery: Delivery, response| {
                    seen.set(delivery.dispatch_attributes());
                    Ok(response)
                }),
            )
            .unwrap();

        let attributes = seen.take().unwrap();
        assert_eq!(attributes.matched_queue, "jobs");
        assert_eq!(attributes.message_id, "m-1");
    }

    #[test]
    fn test_debug_omits_resolver() {
        let worker = WorkerMiddleware::new(MessageMap::new(), Registry::new());
        let debug = format!("{worker:?}");
        assert!(debug.contains("WorkerMiddleware"));
        assert!(debug.contains("messages"));
    }
}
