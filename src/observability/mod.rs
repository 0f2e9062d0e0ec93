//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher produces, per request:
//!     → logging.rs (one structured event: url, method, status, outcome, cost_ms)
//!     → metrics.rs (request counter, latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the trace layer span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::{init_metrics, record_dispatch};
