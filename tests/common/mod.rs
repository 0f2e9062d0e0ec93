//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use trailhead::config::ProfileConfig;
use trailhead::validation::{HeaderCheck, JsonBodyCheck, QueryCheck};
use trailhead::{CheckRegistry, HandlerSet, HttpServer, ServiceConfig, SharedDispatcher};

/// Counts handler invocations.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Handler set used across the scenarios.
///
/// - `GetItem` answers `item`
/// - `Echo` answers with the request body
/// - `Secure` answers `granted`
pub fn handlers(hits: &Hits) -> HandlerSet {
    let item_hits = hits.clone();
    let echo_hits = hits.clone();
    let secure_hits = hits.clone();

    HandlerSet::new()
        .with("GetItem", move |_req: Request<Body>| {
            let hits = item_hits.clone();
            async move {
                hits.bump();
                "item"
            }
        })
        .with("Echo", move |req: Request<Body>| {
            let hits = echo_hits.clone();
            async move {
                hits.bump();
                match to_bytes(req.into_body(), usize::MAX).await {
                    Ok(body) => (StatusCode::OK, body),
                    Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Bytes::new()),
                }
            }
        })
        .with("Secure", move |_req: Request<Body>| {
            let hits = secure_hits.clone();
            async move {
                hits.bump();
                "granted"
            }
        })
}

/// Registry with the stock checks under `header`, `query` and `json`.
pub fn checks() -> CheckRegistry {
    CheckRegistry::new()
        .with("header", HeaderCheck::new("device"))
        .with("query", QueryCheck)
        .with("json", JsonBodyCheck)
}

/// Config with the info route on `/info`.
pub fn config_with_profile() -> ServiceConfig {
    ServiceConfig {
        profile: Some(ProfileConfig {
            url: "/info".to_string(),
            version: "9.9.9".to_string(),
            mode: "test".to_string(),
            ..ProfileConfig::default()
        }),
        ..ServiceConfig::default()
    }
}

/// Full middleware stack over `config`, with the stock handlers and checks.
pub fn router(config: &ServiceConfig, hits: &Hits) -> Router {
    let shared = SharedDispatcher::from_config(
        config,
        Arc::new(handlers(hits)),
        Some(Arc::new(checks())),
    )
    .expect("route table should build");
    HttpServer::build_router(config, Arc::new(shared))
}

/// Send one request through `router`.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
