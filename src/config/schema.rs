//! Configuration schema definitions.
//!
//! This module defines the on-disk shape of the entry file and of include
//! files. All types derive Serde traits for deserialization from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration read from the entry file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Listener address (e.g., "0.0.0.0:8080" or ":8080").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Route definitions, in declaration order.
    #[serde(default, rename = "routers")]
    pub routes: Vec<RouteSpec>,

    /// How routes are keyed in the compiled table.
    #[serde(default)]
    pub dispatch: DispatchMode,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            routes: Vec::new(),
            dispatch: DispatchMode::default(),
        }
    }
}

impl ServerConfig {
    /// Address suitable for `TcpListener::bind`.
    ///
    /// A bare `:port` binds all interfaces.
    pub fn bind_address(&self) -> String {
        listen_address(&self.listen)
    }
}

/// Normalize a `listen` value for binding; a bare `:port` binds all interfaces.
pub fn listen_address(listen: &str) -> String {
    if listen.starts_with(':') {
        format!("0.0.0.0{}", listen)
    } else {
        listen.to_string()
    }
}

/// A single mock endpoint as declared in the entry file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RouteSpec {
    /// Path of an include file, relative to the config directory.
    /// When set, every other field is replaced by the file's contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,

    /// Free text, never interpreted.
    #[serde(default, rename = "desc", alias = "description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Path pattern, e.g. `/users/:id`.
    #[serde(default)]
    pub path: String,

    /// HTTP verb, case-insensitive.
    #[serde(default)]
    pub method: String,

    /// Status code sent on a match.
    #[serde(default)]
    pub status: u16,

    /// Response body, carried verbatim.
    #[serde(default)]
    pub data: Value,
}

impl RouteSpec {
    /// Returns the include reference if it is non-empty.
    pub fn include_ref(&self) -> Option<&str> {
        self.include.as_deref().filter(|s| !s.is_empty())
    }
}

/// Contents of an include file: a standalone route.
///
/// Has no `include` field, so include files never nest.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct IncludedRoute {
    #[serde(default, rename = "desc", alias = "description")]
    pub description: Option<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub data: Value,
}

impl From<IncludedRoute> for RouteSpec {
    fn from(route: IncludedRoute) -> Self {
        Self {
            include: None,
            description: route.description,
            path: route.path,
            method: route.method,
            status: route.status,
            data: route.data,
        }
    }
}

/// Keying policy for the compiled route table.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Routes are keyed by `(method, path)`; methods on one path coexist.
    #[default]
    MethodPath,
    /// Legacy literal-map keying: the last route declared for a path owns
    /// it and every other method on that path is rejected with 405.
    PathOnly,
}
