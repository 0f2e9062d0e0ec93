//! Request normalization into [`Equipment`].
//!
//! # Responsibilities
//! - Capture method, headers, query/form values and raw body for checks
//! - Leave the request body readable for the real handler
//!
//! # Design Decisions
//! - Only GET, POST, PUT and DELETE can be normalized
//! - Bodies are buffered once and handed back to the request as a fresh body
//! - Multipart forms are parsed from a duplicate request built from the buffer

use std::collections::HashMap;
use std::sync::OnceLock;

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Multipart};
use axum::http::{header, HeaderMap, Method, Request};
use regex::Regex;

use crate::error::EquipmentParseError;

/// Primary MIME type for multipart form bodies.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// In-memory ceiling for buffered bodies and multipart forms (32 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 32 << 20;

/// Multi-valued key/value pairs from a query string or form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(HashMap<String, Vec<String>>);

impl FormValues {
    /// Parse a URL-encoded query string.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut values = Self::default();
        if let Some(query) = query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                values.insert(key.into_owned(), value.into_owned());
            }
        }
        values
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    /// All values for `key`, in arrival order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only snapshot of a request, used only by checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: FormValues,
    /// Raw payload; only for POST/PUT/DELETE bodies that are not multipart.
    pub body: Option<Bytes>,
}

impl Equipment {
    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Build [`Equipment`] for `request`, returning the request with a readable body.
///
/// `limit` caps how many body bytes are buffered.
pub async fn normalize(
    request: Request<Body>,
    limit: usize,
) -> Result<(Request<Body>, Equipment), EquipmentParseError> {
    let method = request.method().clone();

    if method == Method::GET {
        let equipment = Equipment {
            headers: request.headers().clone(),
            query: FormValues::from_query(request.uri().query()),
            body: None,
            method,
        };
        return Ok((request, equipment));
    }

    if method != Method::POST && method != Method::PUT && method != Method::DELETE {
        return Err(EquipmentParseError::UnsupportedMethod(method));
    }

    let mime = mime_type(request.headers())
        .ok_or(EquipmentParseError::MissingContentType)?
        .to_ascii_lowercase();

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(EquipmentParseError::BodyRead)?;

    let (query, captured) = if mime == MULTIPART_FORM_DATA {
        let duplicate = Request::from_parts(parts.clone(), Body::from(bytes.clone()));
        (parse_multipart(duplicate).await?, None)
    } else {
        (FormValues::from_query(parts.uri.query()), Some(bytes.clone()))
    };

    let equipment = Equipment {
        method,
        headers: parts.headers.clone(),
        query,
        body: captured,
    };
    Ok((Request::from_parts(parts, Body::from(bytes)), equipment))
}

/// Primary MIME token of the `Content-Type` header.
fn mime_type(headers: &HeaderMap) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z0-9/!#$&^_.+\-]+)").expect("content-type pattern is valid")
    });

    let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    pattern
        .captures(value)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Text fields of a multipart form; file parts are skipped.
async fn parse_multipart(request: Request<Body>) -> Result<FormValues, EquipmentParseError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| EquipmentParseError::Multipart(e.to_string()))?;

    let mut values = FormValues::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| EquipmentParseError::Multipart(e.to_string()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| EquipmentParseError::Multipart(e.to_string()))?;
        values.insert(name, value);
    }
    Ok(values)
}
