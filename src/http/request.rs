//! Request preparation before dispatch.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and echo it on the response
//! - Record the client address in `X-Real-IP` when a proxy has not set it
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An existing `X-Real-IP` header is trusted and left untouched

use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_REAL_IP: &str = "x-real-ip";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Layer assigning `x-request-id` to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<UuidRequestId> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), UuidRequestId)
}

/// Layer copying `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// Request ID header value, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Insert `X-Real-IP` from the peer address if the header is absent or empty.
pub fn ensure_real_ip(headers: &mut HeaderMap, peer: Option<SocketAddr>) {
    let present = headers
        .get(X_REAL_IP)
        .is_some_and(|v| !v.as_bytes().is_empty());
    if present {
        return;
    }
    let Some(peer) = peer else {
        return;
    };
    if let Ok(value) = HeaderValue::from_str(&peer.ip().to_string()) {
        headers.insert(X_REAL_IP, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_ip_injected_from_peer() {
        let mut headers = HeaderMap::new();
        ensure_real_ip(&mut headers, Some("10.1.2.3:5555".parse().unwrap()));
        assert_eq!(headers.get(X_REAL_IP).unwrap(), "10.1.2.3");
    }

    #[test]
    fn test_real_ip_kept_when_present() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REAL_IP, HeaderValue::from_static("192.168.0.9"));
        ensure_real_ip(&mut headers, Some("10.1.2.3:5555".parse().unwrap()));
        assert_eq!(headers.get(X_REAL_IP).unwrap(), "192.168.0.9");
    }

    #[test]
    fn test_real_ip_without_peer() {
        let mut headers = HeaderMap::new();
        ensure_real_ip(&mut headers, None);
        assert!(headers.get(X_REAL_IP).is_none());
    }

    #[test]
    fn test_uuid_request_id() {
        let request = Request::new(());
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&text).is_ok());

        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, id.into_header_value());
        assert_eq!(request_id(&headers), text);
    }
}
