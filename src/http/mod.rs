//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers, single fallback entry point)
//!     → request.rs (request ID, X-Real-IP)
//!     → dispatch (route, validate, invoke)
//!         → equipment.rs (normalized view for checks)
//!         → profile.rs (built-in info route)
//!     → response.rs (status-only responses, CORS)
//!     → Send to client
//! ```

pub mod equipment;
pub mod profile;
pub mod request;
pub mod response;
pub mod server;

pub use equipment::{normalize, Equipment, FormValues};
pub use profile::Profile;
pub use request::{X_REAL_IP, X_REQUEST_ID};
pub use server::HttpServer;
