//! Configuration loading from disk.
//!
//! Reads the entry file, resolves `include` references against the config
//! directory and validates the result. Nothing here touches the live route
//! table, so a failed load cannot disturb requests being served.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{IncludedRoute, RouteSpec, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Entry or include file missing or unreadable.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON in the entry or an include file.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Directory that include paths are resolved against.
pub fn config_dir(entry: &Path) -> PathBuf {
    match entry.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load the entry file and every include it references.
pub fn load(entry: &Path) -> Result<ServerConfig, ConfigError> {
    tracing::debug!(path = %entry.display(), "Loading configuration file");

    let mut config: ServerConfig = read_json(entry)?;
    let dir = config_dir(entry);

    let routes = std::mem::take(&mut config.routes);
    config.routes = routes
        .into_iter()
        .map(|route| resolve_route(&dir, route))
        .collect::<Result<Vec<_>, _>>()?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::debug!(
        path = %entry.display(),
        routes = config.routes.len(),
        "Configuration file loaded"
    );
    Ok(config)
}

fn resolve_route(dir: &Path, route: RouteSpec) -> Result<RouteSpec, ConfigError> {
    let mut resolved = match route.include_ref() {
        Some(include) => {
            let path = dir.join(include);
            let included: IncludedRoute = read_json(&path)?;
            RouteSpec::from(included)
        }
        None => RouteSpec {
            include: None,
            ..route
        },
    };
    resolved.method = resolved.method.to_ascii_uppercase();
    Ok(resolved)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
