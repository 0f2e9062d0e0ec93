//! Hot reload of the route table from the config file.
//!
//! # Data Flow
//! ```text
//! notify event (modify/create) ──▶ wake channel ──▶ reload task
//!                                                     │ load_config
//!                                                     │ SharedDispatcher::reload
//!                                                     ▼
//!                                           new table swapped in, or
//!                                           error logged, old table kept
//! ```
//!
//! The notify callback only wakes the task; loading and route-table building
//! happen on the runtime so a burst of events collapses into one reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::dispatch::SharedDispatcher;
use crate::lifecycle::ShutdownSignal;

/// Outcome of applying the config file to a [`SharedDispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new route table is active.
    Swapped { routes: usize },
    /// The file did not load or validate; the active table is unchanged.
    InvalidConfig,
    /// The config loaded but its routes did not register; the active table is unchanged.
    RejectedRoutes,
}

/// Keeps a [`SharedDispatcher`] in step with a config file.
pub struct ConfigWatcher {
    path: PathBuf,
    shared: Arc<SharedDispatcher>,
}

impl ConfigWatcher {
    pub fn new(path: impl Into<PathBuf>, shared: Arc<SharedDispatcher>) -> Self {
        Self {
            path: path.into(),
            shared,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file once and swap it in if it is valid.
    pub fn apply(&self) -> ReloadOutcome {
        let config = match load_config(&self.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Config rejected, keeping current routes");
                return ReloadOutcome::InvalidConfig;
            }
        };
        match self.shared.reload(&config) {
            Ok(()) => ReloadOutcome::Swapped {
                routes: self.shared.load().table().len(),
            },
            Err(e) => {
                tracing::error!(path = ?self.path, error = %e, "Routes rejected, keeping current routes");
                ReloadOutcome::RejectedRoutes
            }
        }
    }

    /// Watch the file and apply every change until `stop` fires.
    ///
    /// The returned notify handle must be kept alive for events to arrive.
    pub fn spawn(self, mut stop: ShutdownSignal) -> Result<RecommendedWatcher, notify::Error> {
        let (wake_tx, mut wake_rx) = mpsc::channel::<()>(1);

        let mut handle = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    // A full channel already holds a pending wake-up.
                    let _ = wake_tx.try_send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;
        handle.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Watching config for route changes");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    woke = wake_rx.recv() => {
                        if woke.is_none() {
                            break;
                        }
                        if let ReloadOutcome::Swapped { routes } = self.apply() {
                            tracing::info!(path = ?self.path, routes, "Config change applied");
                        }
                    }
                    _ = stop.recv() => break,
                }
            }
        });

        Ok(handle)
    }
}
