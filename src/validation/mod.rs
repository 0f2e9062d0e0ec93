//! Validation pipeline.
//!
//! # Data Flow
//! ```text
//! Matched route with declared checks
//!     → http::equipment (normalize request)
//!     → validate(): for each (name, args) in declared order
//!         - name not in registry → skip
//!         - fire() → Err  → Faulted (stop)
//!         - fire() → false → Failed (stop)
//!         - fire() → true  → next
//!     → Passed
//! ```
//!
//! # Design Decisions
//! - Checks are trait objects registered by name, shared read-only via Arc
//! - Unknown names are skipped so one route file can serve services with
//!   different check sets
//! - A fault is distinct from a rejection and may carry its own response

pub mod checks;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::response::Response;

use crate::error::CheckError;
use crate::http::Equipment;
use crate::routing::Route;

pub use checks::{HeaderCheck, JsonBodyCheck, QueryCheck};

/// A named pre-handler check.
pub trait Check: Send + Sync {
    /// Inspect `equipment` given the route's `prerequisite` arguments.
    ///
    /// `Ok(false)` rejects the request; `Err` means the check itself failed to run.
    fn fire(&self, prerequisite: &[String], equipment: &Equipment) -> Result<bool, CheckError>;

    /// Response to send when this check faults, if it has a preferred one.
    fn error_response(&self) -> Option<Response> {
        None
    }
}

/// Checks available to the dispatcher, keyed by name.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: HashMap<String, Arc<dyn Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<C: Check + 'static>(mut self, name: impl Into<String>, check: C) -> Self {
        self.register(name, check);
        self
    }

    pub fn register<C: Check + 'static>(&mut self, name: impl Into<String>, check: C) {
        self.checks.insert(name.into(), Arc::new(check));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Check>> {
        self.checks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.checks.keys().collect();
        names.sort();
        f.debug_struct("CheckRegistry").field("checks", &names).finish()
    }
}

/// Result of running a route's checks.
pub enum Outcome<'a> {
    Passed,
    /// The named check ran and rejected the request.
    Failed { check: &'a str },
    /// The named check could not run.
    Faulted {
        check: &'a str,
        error: CheckError,
        source: Arc<dyn Check>,
    },
}

impl Outcome<'_> {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

impl fmt::Debug for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => f.write_str("Passed"),
            Outcome::Failed { check } => f.debug_struct("Failed").field("check", check).finish(),
            Outcome::Faulted { check, error, .. } => f
                .debug_struct("Faulted")
                .field("check", check)
                .field("error", error)
                .finish(),
        }
    }
}

/// Run every check declared on `route` against `equipment`.
pub fn validate<'a>(route: &'a Route, equipment: &Equipment, registry: &CheckRegistry) -> Outcome<'a> {
    for (name, args) in route.checks().iter() {
        let Some(check) = registry.get(name) else {
            continue;
        };
        match check.fire(args, equipment) {
            Ok(true) => {}
            Ok(false) => return Outcome::Failed { check: name },
            Err(error) => {
                return Outcome::Faulted {
                    check: name,
                    error,
                    source: Arc::clone(check),
                }
            }
        }
    }
    Outcome::Passed
}
