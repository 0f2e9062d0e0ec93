//! Snapshot-and-swap wrapper for runtime route reloads.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::ServiceConfig;
use crate::dispatch::Dispatcher;
use crate::error::RouteResult;
use crate::routing::HandlerOwner;
use crate::validation::CheckRegistry;

/// Holds the active [`Dispatcher`] and replaces it atomically on reload.
///
/// In-flight requests keep the snapshot they loaded. The body limit is fixed
/// at startup, since the router's `DefaultBodyLimit` layer cannot change.
pub struct SharedDispatcher {
    active: ArcSwap<Dispatcher>,
    owner: Arc<dyn HandlerOwner>,
    checks: Option<Arc<CheckRegistry>>,
    max_body_bytes: usize,
}

impl SharedDispatcher {
    pub fn from_config(
        config: &ServiceConfig,
        owner: Arc<dyn HandlerOwner>,
        checks: Option<Arc<CheckRegistry>>,
    ) -> RouteResult<Self> {
        let dispatcher = Dispatcher::from_config(config, owner.clone(), checks.clone())?;
        Ok(Self {
            active: ArcSwap::from_pointee(dispatcher),
            owner,
            checks,
            max_body_bytes: config.limits.max_body_bytes,
        })
    }

    /// Current snapshot.
    pub fn load(&self) -> Arc<Dispatcher> {
        self.active.load_full()
    }

    /// Build a new dispatcher from `config` and swap it in.
    ///
    /// On error the active dispatcher is left untouched.
    /// A changed `limits.max_body_bytes` is ignored and logged.
    pub fn reload(&self, config: &ServiceConfig) -> RouteResult<()> {
        let mut config = config.clone();
        if config.limits.max_body_bytes != self.max_body_bytes {
            tracing::warn!(
                requested = config.limits.max_body_bytes,
                active = self.max_body_bytes,
                "Body limit is fixed at startup; restart to change it"
            );
            config.limits.max_body_bytes = self.max_body_bytes;
        }
        let dispatcher = Dispatcher::from_config(&config, self.owner.clone(), self.checks.clone())?;
        let routes = dispatcher.table().len();
        self.active.store(Arc::new(dispatcher));
        tracing::info!(routes, "Route table swapped");
        Ok(())
    }
}

impl fmt::Debug for SharedDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedDispatcher")
            .field("routes", &self.active.load().table().len())
            .finish()
    }
}
