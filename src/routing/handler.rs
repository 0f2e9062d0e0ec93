//! Handler references and handler owners.
//!
//! # Responsibilities
//! - Type-erase async handler functions behind [`BoxedHandler`]
//! - Resolve handler names declared in route definitions
//!
//! # Design Decisions
//! - Names are resolved once, when a route is registered; a missing handler
//!   is a startup error rather than a per-request failure
//! - Exported names start with an upper-case ASCII letter

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

/// Future returned by a type-erased handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// An async request handler.
///
/// Implemented for any `Fn(Request<Body>) -> impl Future<Output = impl IntoResponse>`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request<Body>) -> HandlerFuture;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, request: Request<Body>) -> HandlerFuture {
        let fut = (self)(request);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Shared, cloneable handler reference captured by a route at registration.
#[derive(Clone)]
pub struct BoxedHandler(Arc<dyn Handler>);

impl BoxedHandler {
    pub fn new<H: Handler>(handler: H) -> Self {
        Self(Arc::new(handler))
    }

    pub fn call(&self, request: Request<Body>) -> HandlerFuture {
        self.0.call(request)
    }
}

impl fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxedHandler")
    }
}

/// A value exposing named handlers.
pub trait HandlerOwner: Send + Sync {
    /// Look up the handler registered under `name`.
    fn resolve(&self, name: &str) -> Option<BoxedHandler>;
}

/// Stock handler owner backed by a name map.
#[derive(Clone, Default)]
pub struct HandlerSet {
    handlers: HashMap<String, BoxedHandler>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`HandlerSet::insert`].
    pub fn with<H: Handler>(mut self, name: impl Into<String>, handler: H) -> Self {
        self.insert(name, handler);
        self
    }

    pub fn insert<H: Handler>(&mut self, name: impl Into<String>, handler: H) {
        self.handlers.insert(name.into(), BoxedHandler::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerOwner for HandlerSet {
    fn resolve(&self, name: &str) -> Option<BoxedHandler> {
        self.handlers.get(name).cloned()
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerSet").field("handlers", &names).finish()
    }
}

/// Returns true if `name` follows the exported-handler naming convention.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}
