//! Error definitions shared across the routing core.
//!
//! Registration errors surface synchronously at startup. Per-request errors
//! (`EquipmentParseError`, `CheckError`) are turned into status codes by the
//! dispatcher and never reach the client verbatim.

use axum::http::Method;
use thiserror::Error;

/// Errors raised while registering a route.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Pattern, methods or handler missing, or a method token is invalid.
    #[error("invalid route definition: {0}")]
    InvalidRouteDefinition(String),

    /// The pattern is not a valid regular expression.
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Another route already serves this pattern for an overlapping method.
    #[error("route `{pattern}` already registered for method {method}")]
    DuplicateRoute { pattern: String, method: Method },

    /// Handler names must start with an upper-case ASCII letter.
    #[error("handler `{0}` should be exported")]
    HandlerNotExported(String),

    /// The handler owner exposes no handler under this name.
    #[error("handler `{0}` not found on handler owner")]
    HandlerNotFound(String),
}

/// Errors raised while building [`Equipment`](crate::http::Equipment) from a request.
#[derive(Debug, Error)]
pub enum EquipmentParseError {
    #[error("content-type header missing or unparsable")]
    MissingContentType,

    #[error("method {0} not supported for equipment")]
    UnsupportedMethod(Method),

    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("failed to parse multipart form: {0}")]
    Multipart(String),
}

/// A check faulted while executing, as opposed to rejecting the request.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CheckError {
    message: String,
}

impl CheckError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for route registration.
pub type RouteResult<T> = Result<T, RouteError>;
