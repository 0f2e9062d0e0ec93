//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits and timeouts > 0, status codes valid)
//! - Check that route patterns compile and required fields are set
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Duplicate routes and handler names are left to route registration,
//!   which knows the handler owner

use std::net::SocketAddr;

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::routing::matcher::{MethodSet, PathPattern};
use crate::routing::RouteDefinition;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid address `{value}` for {field}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("default_response status {0} is not a 4xx or 5xx code")]
    InvalidStatus(u16),

    #[error("route #{index}: {field} is empty")]
    EmptyRouteField { index: usize, field: &'static str },

    #[error("route #{index}: {reason}")]
    InvalidRoute { index: usize, reason: String },
}

/// Validate a whole configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "limits.max_body_bytes" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if let Some(response) = &config.dispatch.default_response {
        let valid = StatusCode::from_u16(response.status)
            .map(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidStatus(response.status));
        }
    }
    if let Some(profile) = &config.profile {
        if !profile.url.is_empty() {
            if let Err(e) = PathPattern::new(&profile.url) {
                errors.push(ValidationError::InvalidRoute {
                    index: config.routes.len(),
                    reason: format!("profile url: {}", e),
                });
            }
        }
    }

    if let Err(route_errors) = validate_routes(&config.routes) {
        errors.extend(route_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate route definitions field by field.
pub fn validate_routes(routes: &[RouteDefinition]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, route) in routes.iter().enumerate() {
        if route.pattern.is_empty() {
            errors.push(ValidationError::EmptyRouteField { index, field: "pattern" });
        } else if let Err(e) = PathPattern::new(&route.pattern) {
            errors.push(ValidationError::InvalidRoute {
                index,
                reason: format!("pattern `{}`: {}", route.pattern, e),
            });
        }

        if route.methods.is_empty() {
            errors.push(ValidationError::EmptyRouteField { index, field: "methods" });
        } else if let Err(reason) = MethodSet::parse(&route.methods) {
            errors.push(ValidationError::InvalidRoute { index, reason });
        }

        if route.handler.is_empty() {
            errors.push(ValidationError::EmptyRouteField { index, field: "handler" });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
