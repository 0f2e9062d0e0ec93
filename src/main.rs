//! Trailhead demo service.
//!
//! ```text
//!     Client ──▶ http server ──▶ dispatcher ──▶ route table
//!                                    │               │
//!                                    ▼               ▼
//!                             normalize + checks   handler
//! ```
//!
//! Without `--config` the service starts on defaults with a single
//! `GET /hello` route and the `/info` endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use clap::Parser;

use trailhead::config::{load_config, ProfileConfig};
use trailhead::http::X_REAL_IP;
use trailhead::observability::init_logging;
use trailhead::routing::{BoxedHandler, HandlerOwner, RouteDefinition};
use trailhead::validation::{HeaderCheck, JsonBodyCheck, QueryCheck};
use trailhead::{lifecycle, CheckRegistry, ServiceConfig};

#[derive(Parser)]
#[command(name = "trailhead")]
#[command(about = "Regex-routed HTTP dispatch service", long_about = None)]
struct Args {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Handlers shipped with the demo binary.
struct DemoHandler;

impl DemoHandler {
    async fn hello(request: Request<Body>) -> Response {
        let from = request
            .headers()
            .get(X_REAL_IP)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();
        format!("Hello, {from}\n").into_response()
    }

    async fn echo(request: Request<Body>) -> Response {
        match to_bytes(request.into_body(), usize::MAX).await {
            Ok(body) => body.into_response(),
            Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        }
    }
}

impl HandlerOwner for DemoHandler {
    fn resolve(&self, name: &str) -> Option<BoxedHandler> {
        match name {
            "Hello" => Some(BoxedHandler::new(Self::hello)),
            "Echo" => Some(BoxedHandler::new(Self::echo)),
            _ => None,
        }
    }
}

fn default_config() -> ServiceConfig {
    ServiceConfig {
        routes: vec![RouteDefinition::new("/hello", &["GET"], "Hello")],
        profile: Some(ProfileConfig {
            url: "/info".to_string(),
            ..ProfileConfig::default()
        }),
        ..ServiceConfig::default()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let checks = CheckRegistry::new()
        .with("header", HeaderCheck::new("device"))
        .with("query", QueryCheck)
        .with("json", JsonBodyCheck);

    lifecycle::serve(
        config,
        args.config.as_deref(),
        Arc::new(DemoHandler),
        Some(Arc::new(checks)),
    )
    .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
