//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     RouteDefinition[]
//!     → table.rs (validate fields, reject duplicates)
//!     → matcher.rs (compile anchored patterns, parse methods)
//!     → handler.rs (resolve handler name on the owner)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path)
//!     → table.rs (linear scan in registration order)
//!     → Return: Matched(route), MethodMismatch or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes validated at startup, immutable at runtime
//! - Regex patterns anchored at both ends
//! - First match wins (registration order, not specificity)

pub mod handler;
pub mod matcher;
pub mod route;
pub mod table;

pub use handler::{BoxedHandler, Handler, HandlerOwner, HandlerSet};
pub use route::{CheckDeclarations, Route, RouteDefinition, Target};
pub use table::{RouteTable, Scan};
