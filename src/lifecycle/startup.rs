//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the dispatcher from a validated configuration
//! - Start background tasks (metrics endpoint, config reloader)
//! - Bind the listener and serve until a signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, including unknown handler names
//! - Listener binds last (traffic only when the route table is ready)

use std::net::AddrParseError;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigWatcher, ServiceConfig};
use crate::dispatch::SharedDispatcher;
use crate::error::RouteError;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::init_metrics;
use crate::routing::HandlerOwner;
use crate::validation::CheckRegistry;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route registration failed: {0}")]
    Route(#[from] RouteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),

    #[error("metrics exporter failed: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("config watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

/// Serve `config` until SIGINT/SIGTERM.
///
/// When `config_path` is given, the file is watched and valid changes swap in
/// a new route table.
pub async fn serve(
    config: ServiceConfig,
    config_path: Option<&Path>,
    owner: Arc<dyn HandlerOwner>,
    checks: Option<Arc<CheckRegistry>>,
) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let shared = Arc::new(SharedDispatcher::from_config(&config, owner, checks)?);

    let shutdown = Shutdown::new();
    let _watcher = match config_path {
        Some(path) => Some(ConfigWatcher::new(path, shared.clone()).spawn(shutdown.subscribe())?),
        None => None,
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(shared, config);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();

    match server_task.await {
        Ok(result) => result?,
        Err(e) => tracing::error!(error = %e, "Server task panicked"),
    }
    Ok(())
}
