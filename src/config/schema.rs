//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::http::equipment::DEFAULT_BODY_LIMIT;
use crate::routing::RouteDefinition;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions, matched in order.
    pub routes: Vec<RouteDefinition>,

    /// Service info endpoint; omitted means no info route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileConfig>,

    /// Dispatch behaviour (CORS, failure responses).
    pub dispatch: DispatchConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:2111").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:2111".to_string(),
        }
    }
}

/// Service info endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Path of the info route (regex, like any route pattern).
    pub url: String,
    pub version: String,
    pub build_time: String,
    pub rust_version: String,
    /// Deployment mode, e.g. "test" or "production".
    pub mode: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            build_time: String::new(),
            rust_version: String::new(),
            mode: "production".to_string(),
        }
    }
}

/// Dispatch behaviour.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Add permissive CORS headers to every response.
    pub cors: bool,

    /// Let a faulting check write its own response when it has one.
    pub prefer_check_responses: bool,

    /// Response for rejected requests; plain 400 when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_response: Option<DefaultResponse>,
}

/// Operator-defined rejection response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DefaultResponse {
    pub status: u16,
    #[serde(default)]
    pub body: String,
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest body buffered for validation, multipart forms included.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Json,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
