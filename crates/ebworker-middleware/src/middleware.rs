//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every chain element
//! implements, and the [`Next`] continuation a middleware calls to hand the
//! delivery to the rest of the chain.
//!
//! Every chain element and the terminal continuation share one shape:
//! `(delivery, response, next) -> response`. A middleware may enrich the
//! delivery or the response before forwarding, or return early without
//! calling `next`.
//!
//! # Example
//!
//! ```
//! use ebworker_core::{Delivery, DeliveryExt, Response, WorkerResult};
//! use ebworker_middleware::{Middleware, Next};
//!
//! struct AuditMiddleware;
//!
//! impl Middleware for AuditMiddleware {
//!     fn name(&self) -> &str {
//!         "audit"
//!     }
//!
//!     fn process(&self, delivery: Delivery, response: Response, next: Next<'_>) -> WorkerResult<Response> {
//!         let delivery = delivery.with_attribute("audited", true)?;
//!         next.run(delivery, response)
//!     }
//! }
//! ```

use ebworker_core::{Delivery, Response, WorkerResult};

/// The core middleware trait.
///
/// # Invariants
///
/// - Middleware SHOULD call `next.run()` exactly once (unless short-circuiting)
/// - Middleware MUST NOT swallow errors returned by `next`
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs.
    fn name(&self) -> &str;

    /// Processes the delivery.
    ///
    /// # Arguments
    ///
    /// * `delivery` - The (attribute-enriched) delivery
    /// * `response` - The response produced so far
    /// * `next` - Continuation invoking the rest of the chain
    fn process(&self, delivery: Delivery, response: Response, next: Next<'_>)
        -> WorkerResult<Response>;
}

/// Continuation invoking the rest of the chain.
///
/// `run` consumes the continuation, so it can be called at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process.
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain, supplied by the caller.
    Terminal(Box<dyn FnOnce(Delivery, Response) -> WorkerResult<Response> + 'a>),
    /// End of chain, returning the response unchanged.
    Passthrough,
}

impl<'a> Next<'a> {
    /// Creates a continuation that invokes `middleware`, then `next`.
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal continuation from a closure.
    pub fn terminal<F>(f: F) -> Self
    where
        F: FnOnce(Delivery, Response) -> WorkerResult<Response> + 'a,
    {
        Self {
            inner: NextInner::Terminal(Box::new(f)),
        }
    }

    /// Creates a terminal continuation that returns the response unchanged.
    #[must_use]
    pub fn passthrough() -> Self {
        Self {
            inner: NextInner::Passthrough,
        }
    }

    /// Builds a chain running `middlewares` in order, ending in `terminal`.
    ///
    /// The chain is a right fold: the last middleware's `next` is `terminal`,
    /// every earlier middleware's `next` is its successor. With no middleware
    /// the terminal continuation itself is returned.
    pub fn chain<I>(middlewares: I, terminal: Next<'a>) -> Self
    where
        I: IntoIterator<Item = &'a dyn Middleware>,
        I::IntoIter: DoubleEndedIterator,
    {
        middlewares
            .into_iter()
            .rev()
            .fold(terminal, |next, middleware| Self::new(middleware, next))
    }

    /// Invokes the next middleware or the terminal continuation.
    pub fn run(self, delivery: Delivery, response: Response) -> WorkerResult<Response> {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(delivery, response, *next),
            NextInner::Terminal(terminal) => terminal(delivery, response),
            NextInner::Passthrough => Ok(response),
        }
    }
}

impl Default for Next<'_> {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            NextInner::Chain { middleware, .. } => {
                f.debug_tuple("Next::Chain").field(&middleware.name()).finish()
            }
            NextInner::Terminal(_) => f.write_str("Next::Terminal"),
            NextInner::Passthrough => f.write_str("Next::Passthrough"),
        }
    }
}

/// A middleware created from a function.
///
/// # Example
///
/// ```
/// use ebworker_middleware::FnMiddleware;
///
/// let middleware = FnMiddleware::new("noop", |delivery, response, next| next.run(delivery, response));
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(Delivery, Response, Next<'_>) -> WorkerResult<Response> + Send + Sync + 'static,
{
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(Delivery, Response, Next<'_>) -> WorkerResult<Response> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn process(&self, delivery: Delivery, response: Response, next: Next<'_>) -> WorkerResult<Response> {
        (self.func)(delivery, response, next)
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware").field("name", &self.name).finish()
    }
}
