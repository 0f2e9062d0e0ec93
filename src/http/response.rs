//! Response finishing.
//!
//! # Responsibilities
//! - Build the status-only responses the dispatcher emits on its own
//! - Add permissive CORS headers when enabled
//!
//! # Design Decisions
//! - CORS is all-or-nothing: every response gets `*` for origin, headers and methods
//! - Responses written by handlers or checks are never rewritten, only decorated

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Operator-configured failure response, used when validation rejects a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl FailureResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        (self.status, Body::from(self.body)).into_response()
    }
}

/// Empty response carrying only `status`.
pub fn status_only(status: StatusCode) -> Response {
    status.into_response()
}

/// Set `Access-Control-Allow-{Origin,Headers,Methods}: *`.
pub fn apply_cors(headers: &mut HeaderMap) {
    let any = HeaderValue::from_static("*");
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, any);
}
