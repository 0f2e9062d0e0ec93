//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → dispatch::Dispatcher::from_config
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → SharedDispatcher builds a new route table and swaps it in
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_routes, parse_config, ConfigError};
pub use schema::{
    DefaultResponse, DispatchConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ProfileConfig, ServiceConfig,
};
pub use watcher::{ConfigWatcher, ReloadOutcome};
