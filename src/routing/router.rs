//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Compile resolved routes into an immutable table
//! - Look up a request by method and path
//! - Report an explicit outcome: matched, wrong method, or no route
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup for literal paths via HashMap
//! - O(n) scan over parameterized paths in declaration order
//! - Later declarations of the same key overwrite earlier ones

use std::collections::HashMap;

use axum::http::Method;
use serde_json::Value;

use crate::config::{DispatchMode, RouteSpec, ServerConfig};
use crate::routing::matcher::PathPattern;

/// What a matched route answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResponse {
    pub status: u16,
    pub data: Value,
}

/// All methods registered for one path pattern.
#[derive(Debug, Clone)]
struct PathEntry {
    pattern: PathPattern,
    methods: HashMap<Method, RouteResponse>,
}

/// Result of looking up a request.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a> {
    Matched {
        /// Pattern that matched, as configured.
        path: &'a str,
        response: &'a RouteResponse,
        params: Vec<(String, String)>,
    },
    /// The path exists but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// Compiled, immutable dispatch table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    literal: HashMap<String, PathEntry>,
    parameterized: Vec<PathEntry>,
    has_root_path: bool,
}

impl RouteTable {
    /// Build a table from a fully-resolved config.
    pub fn build(config: &ServerConfig) -> Self {
        let mut table = Self::default();

        for route in &config.routes {
            table.register(route, config.dispatch);
        }

        table.has_root_path = table.literal.contains_key("/");

        tracing::debug!(
            literal = table.literal.len(),
            parameterized = table.parameterized.len(),
            has_root_path = table.has_root_path,
            "Route table built"
        );
        table
    }

    fn register(&mut self, route: &RouteSpec, mode: DispatchMode) {
        // Validation has already rejected bad tokens.
        let Ok(method) = Method::from_bytes(route.method.as_bytes()) else {
            tracing::warn!(method = %route.method, path = %route.path, "Skipping route with invalid method");
            return;
        };

        let pattern = PathPattern::parse(route.path.clone());
        let entry = if pattern.is_literal() {
            self.literal
                .entry(route.path.clone())
                .or_insert_with(|| PathEntry {
                    pattern,
                    methods: HashMap::new(),
                })
        } else {
            match self
                .parameterized
                .iter()
                .position(|e| e.pattern.as_str() == route.path)
            {
                Some(i) => &mut self.parameterized[i],
                None => {
                    self.parameterized.push(PathEntry {
                        pattern,
                        methods: HashMap::new(),
                    });
                    let last = self.parameterized.len() - 1;
                    &mut self.parameterized[last]
                }
            }
        };

        if mode == DispatchMode::PathOnly {
            entry.methods.clear();
        }

        let previous = entry.methods.insert(
            method.clone(),
            RouteResponse {
                status: route.status,
                data: route.data.clone(),
            },
        );
        if previous.is_some() {
            tracing::debug!(method = %method, path = %route.path, "Route overrides an earlier declaration");
        }
        tracing::debug!(method = %method, path = %route.path, status = route.status, "Registered route");
    }

    /// Whether a route claims the root path `/`.
    pub fn has_root_path(&self) -> bool {
        self.has_root_path
    }

    /// Number of distinct `(method, path)` keys.
    pub fn len(&self) -> usize {
        self.literal
            .values()
            .chain(self.parameterized.iter())
            .map(|e| e.methods.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a request path and method.
    ///
    /// Every pattern matching `path` is considered, literal first and then
    /// parameterized in declaration order; the first one registered for
    /// `method` wins. 405 only when some pattern matched the path.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_> {
        let literal = self.literal.get(path).map(|e| (e, Vec::new()));
        let parameterized = self
            .parameterized
            .iter()
            .filter_map(|e| e.pattern.matches(path).map(|params| (e, params)));

        let mut path_matched = false;
        for (entry, params) in literal.into_iter().chain(parameterized) {
            path_matched = true;
            if let Some(response) = entry.methods.get(method) {
                return Lookup::Matched {
                    path: entry.pattern.as_str(),
                    response,
                    params,
                };
            }
        }

        if path_matched {
            Lookup::MethodNotAllowed
        } else {
            Lookup::NotFound
        }
    }
}
