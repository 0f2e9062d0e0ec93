//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! Request (method, path, peer)
//!     → X-Real-IP injection
//!     → RouteTable::scan
//!         NotFound        → 404
//!         MethodMismatch  → 400
//!         Matched(info)   → profile JSON
//!         Matched(route)  → [normalize → validate] → handler
//!     → CORS headers, log event, metrics
//! ```
//!
//! # Design Decisions
//! - Exactly one response per request; a rejected request never reaches its handler
//! - Validation runs only when the route declares checks and a non-empty
//!   registry is configured
//! - Logging goes through a span owned by the dispatcher, not a global logger

pub mod shared;

use std::borrow::Cow;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, Span};
use percent_encoding::percent_decode_str;

use crate::config::ServiceConfig;
use crate::error::RouteResult;
use crate::http::equipment::{normalize, DEFAULT_BODY_LIMIT};
use crate::http::request::{ensure_real_ip, request_id};
use crate::http::response::{apply_cors, status_only, FailureResponse};
use crate::http::Profile;
use crate::observability::metrics::record_dispatch;
use crate::routing::{HandlerOwner, Route, RouteDefinition, RouteTable, Scan, Target};
use crate::validation::{validate, CheckRegistry, Outcome};

pub use shared::SharedDispatcher;

/// How a request was settled.
pub enum Verdict {
    /// The route's handler ran and produced this response.
    Served(Response),
    /// The built-in info route answered.
    Info(Response),
    /// Normalization or a check rejected the request.
    TrialFailed(Response),
    /// A pattern matched the path but no route accepted the method.
    MethodMismatch,
    /// No pattern matched the path.
    NotFound,
}

impl Verdict {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Served(_) => "served",
            Verdict::Info(_) => "info",
            Verdict::TrialFailed(_) => "trial_failed",
            Verdict::MethodMismatch => "method_mismatch",
            Verdict::NotFound => "not_found",
        }
    }
}

impl IntoResponse for Verdict {
    fn into_response(self) -> Response {
        match self {
            Verdict::Served(r) | Verdict::Info(r) | Verdict::TrialFailed(r) => r,
            Verdict::MethodMismatch => status_only(StatusCode::BAD_REQUEST),
            Verdict::NotFound => status_only(StatusCode::NOT_FOUND),
        }
    }
}

/// Dispatch behaviour toggles.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    pub cors: bool,
    pub prefer_check_responses: bool,
    pub default_response: Option<FailureResponse>,
    pub max_body_bytes: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            cors: false,
            prefer_check_responses: false,
            default_response: None,
            max_body_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Routes requests to handlers through the validation pipeline.
#[derive(Debug)]
pub struct Dispatcher {
    table: RouteTable,
    checks: Option<Arc<CheckRegistry>>,
    options: DispatchOptions,
    span: Span,
}

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    owner: Arc<dyn HandlerOwner>,
    checks: Option<Arc<CheckRegistry>>,
    profile: Option<Profile>,
    options: DispatchOptions,
    span: Option<Span>,
}

impl DispatcherBuilder {
    pub fn checks(mut self, registry: Arc<CheckRegistry>) -> Self {
        self.checks = Some(registry);
        self
    }

    /// Serve `profile` on its URL as the built-in info route.
    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn cors(mut self, enabled: bool) -> Self {
        self.options.cors = enabled;
        self
    }

    pub fn prefer_check_responses(mut self, enabled: bool) -> Self {
        self.options.prefer_check_responses = enabled;
        self
    }

    pub fn default_response(mut self, response: FailureResponse) -> Self {
        self.options.default_response = Some(response);
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.options.max_body_bytes = limit;
        self
    }

    /// Span all dispatch events are recorded in.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Register `routes` (then the info route, if any) and build the dispatcher.
    pub fn build(self, routes: &[RouteDefinition]) -> RouteResult<Dispatcher> {
        let mut table = RouteTable::new();
        table.register_all(routes, self.owner.as_ref())?;

        if let Some(profile) = self.profile.filter(|p| !p.url.is_empty()) {
            table.register_info(Arc::new(profile))?;
        }

        if let Some(registry) = &self.checks {
            for route in table.iter() {
                for name in route.checks().names().filter(|n| !registry.contains(n)) {
                    tracing::warn!(
                        pattern = %route.pattern(),
                        check = %name,
                        "Route declares a check the registry does not provide; it will be skipped"
                    );
                }
            }
        }

        tracing::info!(routes = table.len(), "Route table built");

        Ok(Dispatcher {
            table,
            checks: self.checks,
            options: self.options,
            span: self.span.unwrap_or_else(|| tracing::info_span!("dispatcher")),
        })
    }
}

impl Dispatcher {
    pub fn builder(owner: Arc<dyn HandlerOwner>) -> DispatcherBuilder {
        DispatcherBuilder {
            owner,
            checks: None,
            profile: None,
            options: DispatchOptions::default(),
            span: None,
        }
    }

    /// Build a dispatcher from a loaded configuration.
    pub fn from_config(
        config: &ServiceConfig,
        owner: Arc<dyn HandlerOwner>,
        checks: Option<Arc<CheckRegistry>>,
    ) -> RouteResult<Self> {
        let mut builder = Self::builder(owner)
            .cors(config.dispatch.cors)
            .prefer_check_responses(config.dispatch.prefer_check_responses)
            .max_body_bytes(config.limits.max_body_bytes);

        if let Some(registry) = checks {
            builder = builder.checks(registry);
        }
        if let Some(profile) = &config.profile {
            builder = builder.profile(Profile::from(profile));
        }
        if let Some(response) = &config.dispatch.default_response {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_REQUEST);
            builder = builder.default_response(FailureResponse::new(status, response.body.clone()));
        }

        builder.build(&config.routes)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Handle one request end to end. Always produces exactly one response.
    pub async fn dispatch(&self, mut request: Request<Body>, peer: Option<SocketAddr>) -> Response {
        let start = Instant::now();
        ensure_real_ip(request.headers_mut(), peer);

        let path = request.uri().path().to_string();
        let method = request.method().clone();
        let request_id = request_id(request.headers()).to_string();

        let verdict = self.decide(request).instrument(self.span.clone()).await;
        let outcome = verdict.label();

        let mut response = verdict.into_response();
        if self.options.cors {
            apply_cors(response.headers_mut());
        }

        let elapsed = start.elapsed();
        let status = response.status().as_u16();
        self.span.in_scope(|| {
            tracing::info!(
                request_id = %request_id,
                url = %path,
                method = %method,
                status,
                outcome,
                cost_ms = elapsed.as_millis() as u64,
                "OK"
            );
        });
        record_dispatch(&method, status, outcome, elapsed);

        response
    }

    async fn decide(&self, request: Request<Body>) -> Verdict {
        let path = decoded_path(request.uri().path());
        let route = match self.table.scan(request.method(), &path) {
            Scan::Matched(route) => route,
            Scan::MethodMismatch => return Verdict::MethodMismatch,
            Scan::NotFound => return Verdict::NotFound,
        };

        let handler = match route.target() {
            Target::Info(profile) => return Verdict::Info(profile.respond()),
            Target::Handler(handler) => handler,
        };

        match self.trial(route, request).await {
            Ok(request) => Verdict::Served(handler.call(request).await),
            Err(response) => Verdict::TrialFailed(response),
        }
    }

    /// Run the route's checks; hands back the request if they all pass.
    async fn trial(&self, route: &Route, request: Request<Body>) -> Result<Request<Body>, Response> {
        let registry = match &self.checks {
            Some(registry) if !registry.is_empty() && !route.checks().is_empty() => registry,
            _ => return Ok(request),
        };

        let (request, equipment) = match normalize(request, self.options.max_body_bytes).await {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::warn!(pattern = %route.pattern(), error = %e, "Equipment parse failed");
                return Err(self.failure_response());
            }
        };

        match validate(route, &equipment, registry) {
            Outcome::Passed => Ok(request),
            Outcome::Failed { check } => {
                tracing::debug!(pattern = %route.pattern(), check, "Validation failed");
                Err(self.failure_response())
            }
            Outcome::Faulted { check, error, source } => {
                tracing::error!(pattern = %route.pattern(), check, error = %error, "Check faulted");
                if self.options.prefer_check_responses {
                    if let Some(response) = source.error_response() {
                        return Err(response);
                    }
                }
                Err(self.failure_response())
            }
        }
    }

    fn failure_response(&self) -> Response {
        match &self.options.default_response {
            Some(response) => response.clone().into_response(),
            None => status_only(StatusCode::BAD_REQUEST),
        }
    }
}

/// Percent-decoded request path; the raw path when decoding is not valid UTF-8.
fn decoded_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw))
}
