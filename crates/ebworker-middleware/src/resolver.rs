//! Middleware resolution.
//!
//! The dispatch shim only knows middleware by identifier. A [`Resolver`] turns
//! an identifier into an invocable middleware; hosts plug in whatever
//! service container they already have. [`Registry`] is a plain in-memory
//! implementation.
//!
//! # Example
//!
//! ```rust
//! use ebworker_middleware::{FnMiddleware, Registry, Resolver};
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     "SendWelcomeEmail",
//!     FnMiddleware::new("send_welcome_email", |delivery, response, next| next.run(delivery, response)),
//! );
//!
//! let middleware = registry.resolve("SendWelcomeEmail").unwrap();
//! assert_eq!(middleware.name(), "send_welcome_email");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use ebworker_core::{WorkerError, WorkerResult};

use crate::middleware::Middleware;

/// A type-erased middleware that can be shared across dispatches.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Resolves a middleware identifier to an invocable middleware.
///
/// Failures are returned to the dispatcher's caller unchanged.
pub trait Resolver: Send + Sync {
    /// Resolves `identifier`.
    fn resolve(&self, identifier: &str) -> WorkerResult<BoxedMiddleware>;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> WorkerResult<BoxedMiddleware> + Send + Sync,
{
    fn resolve(&self, identifier: &str) -> WorkerResult<BoxedMiddleware> {
        self(identifier)
    }
}

impl<R: Resolver + ?Sized> Resolver for Arc<R> {
    fn resolve(&self, identifier: &str) -> WorkerResult<BoxedMiddleware> {
        (**self).resolve(identifier)
    }
}

type Factory = Box<dyn Fn() -> BoxedMiddleware + Send + Sync>;

enum Entry {
    Instance(BoxedMiddleware),
    Factory(Factory),
}

/// An in-memory middleware registry keyed by identifier.
///
/// Entries are either shared instances or factories invoked on every
/// resolution.
///
/// # Thread Safety
///
/// The registry is `Send + Sync` and is only read during dispatch.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Entry>,
}

impl Registry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a middleware instance under `identifier`.
    ///
    /// Registering the same identifier twice replaces the earlier entry.
    pub fn register<M: Middleware>(&mut self, identifier: impl Into<String>, middleware: M) {
        self.register_shared(identifier, Arc::new(middleware));
    }

    /// Registers an already shared middleware instance.
    pub fn register_shared(&mut self, identifier: impl Into<String>, middleware: BoxedMiddleware) {
        self.entries
            .insert(identifier.into(), Entry::Instance(middleware));
    }

    /// Registers a factory building a fresh middleware on each resolution.
    pub fn register_factory<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn() -> BoxedMiddleware + Send + Sync + 'static,
    {
        self.entries
            .insert(identifier.into(), Entry::Factory(Box::new(factory)));
    }

    /// Returns the registry with an additional instance.
    #[must_use]
    pub fn with<M: Middleware>(mut self, identifier: impl Into<String>, middleware: M) -> Self {
        self.register(identifier, middleware);
        self
    }

    /// Checks if an identifier is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Returns the number of registered identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Resolver for Registry {
    fn resolve(&self, identifier: &str) -> WorkerResult<BoxedMiddleware> {
        match self.entries.get(identifier) {
            Some(Entry::Instance(middleware)) => Ok(Arc::clone(middleware)),
            Some(Entry::Factory(factory)) => Ok(factory()),
            None => Err(WorkerError::unresolved(identifier, "not registered")),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut identifiers: Vec<_> = self.entries.keys().collect();
        identifiers.sort();
        f.debug_struct("Registry")
            .field("identifiers", &identifiers)
            .finish()
    }
}
