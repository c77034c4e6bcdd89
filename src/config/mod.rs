//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! entry file (JSON)
//!     → loader.rs (parse, resolve `include` files)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (fully resolved, immutable)
//!     → routing::RouteTable::build
//!
//! On change:
//!     watcher.rs detects a write under the config directory
//!     → reload controller re-runs the pipeline above
//!     → atomic swap of the live route table
//! ```
//!
//! # Design Decisions
//! - Loading never mutates routing state; a failed load is harmless
//! - Include files replace the referencing route wholesale
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{config_dir, load, ConfigError};
pub use schema::{listen_address, DispatchMode, IncludedRoute, RouteSpec, ServerConfig};
pub use validation::ValidationError;
pub use watcher::{ConfigChange, ConfigWatcher};
