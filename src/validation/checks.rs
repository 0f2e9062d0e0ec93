//! Stock checks.
//!
//! - `HeaderCheck`: `["true", names...]` requires the named headers (or the
//!   check's default header) to be present and non-empty; `["false"]` passes.
//! - `QueryCheck`: every argument names a query/form key that must be present.
//! - `JsonBodyCheck`: the body must be a JSON object holding every argument as a key.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::CheckError;
use crate::http::Equipment;
use crate::validation::Check;

/// Requires request headers to be present.
#[derive(Debug, Clone)]
pub struct HeaderCheck {
    default_header: String,
}

impl HeaderCheck {
    pub fn new(default_header: impl Into<String>) -> Self {
        Self {
            default_header: default_header.into(),
        }
    }
}

impl Check for HeaderCheck {
    fn fire(&self, prerequisite: &[String], equipment: &Equipment) -> Result<bool, CheckError> {
        let Some((enabled, names)) = prerequisite.split_first() else {
            return Ok(false);
        };
        if enabled != "true" {
            return Ok(true);
        }

        let present = |name: &str| equipment.header(name).is_some_and(|v| !v.is_empty());
        if names.is_empty() {
            return Ok(present(self.default_header.as_str()));
        }
        Ok(names.iter().all(|name| present(name.as_str())))
    }
}

/// Requires query (or multipart form) keys to be present.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCheck;

impl Check for QueryCheck {
    fn fire(&self, prerequisite: &[String], equipment: &Equipment) -> Result<bool, CheckError> {
        Ok(prerequisite
            .iter()
            .all(|key| equipment.query.contains_key(key)))
    }
}

/// Requires a JSON object body with the listed top-level keys.
///
/// A body that is not valid JSON is a rejection; a request without a captured
/// body cannot be inspected and is reported as a fault.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyCheck;

impl Check for JsonBodyCheck {
    fn fire(&self, prerequisite: &[String], equipment: &Equipment) -> Result<bool, CheckError> {
        let body = equipment
            .body
            .as_ref()
            .ok_or_else(|| CheckError::new("no request body captured for json check"))?;

        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(_) => return Ok(false),
        };
        let Some(object) = value.as_object() else {
            return Ok(false);
        };
        Ok(prerequisite.iter().all(|key| object.contains_key(key)))
    }

    fn error_response(&self) -> Option<Response> {
        Some((StatusCode::UNSUPPORTED_MEDIA_TYPE, "json body required").into_response())
    }
}
