//! Service info endpoint.

use std::path::Path;

use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::config::schema::ProfileConfig;

/// Metadata describing the running service, served as JSON on the info route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Application name (executable file name).
    pub name: String,
    pub version: String,
    pub build_time: String,
    pub rust_version: String,
    /// Deployment mode, e.g. `test` or `production`.
    pub mode: String,
    /// Path the info route is registered under.
    pub url: String,
    pub desc: String,
}

impl Profile {
    pub fn new(
        url: impl Into<String>,
        version: impl Into<String>,
        build_time: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        let name = program_name();
        Self {
            desc: format!("{} application.\n", name),
            name,
            version: version.into(),
            build_time: build_time.into(),
            rust_version: String::new(),
            mode: mode.into(),
            url: url.into(),
        }
    }

    pub fn with_rust_version(mut self, rust_version: impl Into<String>) -> Self {
        self.rust_version = rust_version.into();
        self
    }

    /// Multi-line, human readable summary.
    pub fn description(&self) -> String {
        format!(
            "{}\tdeployment mode: {}\n\tbuild time: {}\n\tversion: {}\n\trust version: {}",
            self.desc, self.mode, self.build_time, self.version, self.rust_version
        )
    }

    /// JSON response for the info route.
    pub fn respond(&self) -> Response {
        Json(self).into_response()
    }
}

impl From<&ProfileConfig> for Profile {
    fn from(config: &ProfileConfig) -> Self {
        Profile::new(
            config.url.clone(),
            config.version.clone(),
            config.build_time.clone(),
            config.mode.clone(),
        )
        .with_rust_version(config.rust_version.clone())
    }
}

fn program_name() -> String {
    std::env::args()
        .next()
        .and_then(|arg| {
            Path::new(&arg)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}
