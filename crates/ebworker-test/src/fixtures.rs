//! Middleware fixtures.

use bytes::Bytes;
use ebworker_core::{Delivery, DeliveryExt, Response, WorkerError, WorkerResult};
use ebworker_middleware::{Middleware, Next};
use http::HeaderValue;
use parking_lot::Mutex;
use serde_json::Value;

/// Attribute and response header written by [`CountingMiddleware`].
pub const COUNTER: &str = "counter";

/// Increments the `counter` attribute and response header, then forwards.
///
/// A missing counter counts as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingMiddleware;

impl CountingMiddleware {
    /// Creates a counting middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reads the counter attribute of a delivery.
    #[must_use]
    pub fn count_of(delivery: &Delivery) -> u64 {
        delivery
            .attribute(COUNTER)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }

    /// Reads the counter header of a response.
    #[must_use]
    pub fn header_count_of(response: &Response) -> Option<u64> {
        response
            .headers()
            .get(COUNTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }
}

impl Middleware for CountingMiddleware {
    fn name(&self) -> &str {
        "counting"
    }

    fn process(&self, delivery: Delivery, mut response: Response, next: Next<'_>) -> WorkerResult<Response> {
        let count = Self::count_of(&delivery) + 1;
        let delivery = delivery.with_attribute(COUNTER, count)?;
        response
            .headers_mut()
            .insert(COUNTER, HeaderValue::from(count));
        next.run(delivery, response)
    }
}

/// Terminal continuation that records what reached the end of the chain.
///
/// # Example
///
/// ```
/// use ebworker_test::{TerminalProbe, TestDelivery};
///
/// let probe = TerminalProbe::new();
/// let delivery = TestDelivery::builder().build().unwrap();
///
/// probe.terminal().run(delivery, TestDelivery::response()).unwrap();
/// assert_eq!(probe.calls(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TerminalProbe {
    state: Mutex<ProbeState>,
}

#[derive(Debug, Default)]
struct ProbeState {
    calls: usize,
    delivery: Option<Delivery>,
    response_body: Option<Bytes>,
}

impl TerminalProbe {
    /// Creates a probe that has not been called.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a continuation recording its input and returning the response
    /// unchanged.
    pub fn terminal(&self) -> Next<'_> {
        Next::terminal(move |delivery, response: Response| {
            let mut state = self.state.lock();
            state.calls += 1;
            state.response_body = Some(response.body().clone());
            state.delivery = Some(delivery);
            Ok(response)
        })
    }

    /// Returns a continuation that fails with `message` after recording.
    pub fn failing_terminal(&self, message: &'static str) -> Next<'_> {
        Next::terminal(move |delivery, _response: Response| {
            let mut state = self.state.lock();
            state.calls += 1;
            state.delivery = Some(delivery);
            Err(WorkerError::handler(std::io::Error::other(message)))
        })
    }

    /// Returns how many times the terminal continuation ran.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    /// Returns `true` if the terminal continuation ran.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.calls() > 0
    }

    /// Takes the last delivery that reached the terminal continuation.
    pub fn take_delivery(&self) -> Option<Delivery> {
        self.state.lock().delivery.take()
    }

    /// Returns the body of the last response that reached the terminal
    /// continuation.
    #[must_use]
    pub fn response_body(&self) -> Option<Bytes> {
        self.state.lock().response_body.clone()
    }
}
