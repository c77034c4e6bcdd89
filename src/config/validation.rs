//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (status codes, method tokens, path shape)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs after include resolution, before the config reaches the route table

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem in a resolved configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listen address is empty")]
    EmptyListen,

    #[error("route #{index}: path {path:?} must start with '/'")]
    InvalidPath { index: usize, path: String },

    #[error("route #{index} ({path}): invalid method {method:?}")]
    InvalidMethod {
        index: usize,
        path: String,
        method: String,
    },

    #[error("route #{index} ({path}): status {status} is outside 100..=999")]
    InvalidStatus {
        index: usize,
        path: String,
        status: u16,
    },
}

/// Check a fully-resolved config.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen.trim().is_empty() {
        errors.push(ValidationError::EmptyListen);
    }

    for (index, route) in config.routes.iter().enumerate() {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                index,
                path: route.path.clone(),
            });
        }

        if route.method.is_empty() || Method::from_bytes(route.method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod {
                index,
                path: route.path.clone(),
                method: route.method.clone(),
            });
        }

        if !(100..=999).contains(&route.status) {
            errors.push(ValidationError::InvalidStatus {
                index,
                path: route.path.clone(),
                status: route.status,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteSpec;

    fn route(path: &str, method: &str, status: u16) -> RouteSpec {
        RouteSpec {
            path: path.into(),
            method: method.into(),
            status,
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        let config = ServerConfig {
            routes: vec![route("/a", "GET", 200), route("/users/:id", "DELETE", 204)],
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let config = ServerConfig {
            listen: " ".into(),
            routes: vec![route("a", "GET", 200), route("/b", "", 0), route("/c", "BAD VERB", 200)],
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[0], ValidationError::EmptyListen);
        assert!(matches!(errors[1], ValidationError::InvalidPath { index: 0, .. }));
        assert!(matches!(errors[2], ValidationError::InvalidMethod { index: 1, .. }));
        assert!(matches!(errors[3], ValidationError::InvalidStatus { index: 1, status: 0, .. }));
        assert!(matches!(errors[4], ValidationError::InvalidMethod { index: 2, .. }));
    }
}
