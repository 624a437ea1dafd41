//! A resolver that records what it was asked for.

use ebworker_core::WorkerResult;
use ebworker_middleware::{BoxedMiddleware, Middleware, Registry, Resolver};
use parking_lot::Mutex;

/// Registry-backed resolver recording every identifier it resolves.
///
/// Failed resolutions are recorded too.
///
/// # Example
///
/// ```
/// use ebworker_middleware::Resolver;
/// use ebworker_test::{CountingMiddleware, RecordingResolver};
///
/// let resolver = RecordingResolver::new().with("FooMiddleware", CountingMiddleware::new());
///
/// assert!(resolver.resolve("FooMiddleware").is_ok());
/// assert!(resolver.resolve("BarMiddleware").is_err());
/// assert_eq!(resolver.requested(), ["FooMiddleware", "BarMiddleware"]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingResolver {
    registry: Registry,
    requested: Mutex<Vec<String>>,
}

impl RecordingResolver {
    /// Creates a resolver with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver backed by `registry`.
    #[must_use]
    pub fn from_registry(registry: Registry) -> Self {
        Self {
            registry,
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Returns the resolver with an additional middleware.
    #[must_use]
    pub fn with<M: Middleware>(mut self, identifier: impl Into<String>, middleware: M) -> Self {
        self.registry.register(identifier, middleware);
        self
    }

    /// Returns the identifiers requested so far, in order.
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    /// Returns the number of resolutions attempted.
    #[must_use]
    pub fn resolution_count(&self) -> usize {
        self.requested.lock().len()
    }

    /// Forgets recorded resolutions.
    pub fn reset(&self) {
        self.requested.lock().clear();
    }
}

impl Resolver for RecordingResolver {
    fn resolve(&self, identifier: &str) -> WorkerResult<BoxedMiddleware> {
        self.requested.lock().push(identifier.to_string());
        self.registry.resolve(identifier)
    }
}
