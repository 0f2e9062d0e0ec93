//! Trailhead: a small HTTP dispatch framework.
//!
//! Routes pair a regex path pattern and a method set with a named handler and
//! an ordered list of declared checks. A single entry point scans the route
//! table, normalizes and validates the request, then invokes the handler.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod validation;

pub use config::schema::ServiceConfig;
pub use dispatch::{Dispatcher, SharedDispatcher};
pub use error::{CheckError, EquipmentParseError, RouteError};
pub use http::{Equipment, HttpServer, Profile};
pub use lifecycle::Shutdown;
pub use routing::{HandlerOwner, HandlerSet, RouteDefinition};
pub use validation::{Check, CheckRegistry};
