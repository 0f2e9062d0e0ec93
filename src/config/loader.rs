//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, validate_routes, ValidationError};
use crate::routing::RouteDefinition;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[derive(Deserialize)]
struct RoutesFile {
    #[serde(default)]
    routes: Vec<RouteDefinition>,
}

/// Load a file holding only `[[routes]]` entries.
pub fn load_routes(path: &Path) -> Result<Vec<RouteDefinition>, ConfigError> {
    let content = fs::read_to_string(path)?;
    let file: RoutesFile = toml::from_str(&content)?;
    validate_routes(&file.routes).map_err(ConfigError::Validation)?;
    Ok(file.routes)
}
