//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (startup and every reload):
//!     ServerConfig.routes (resolved, in declaration order)
//!     → router.rs (register (method, path) → {status, data})
//!     → matcher.rs (compile literal / :param segments)
//!     → Freeze as immutable RouteTable
//!     → shared.rs (atomic install)
//!
//! Incoming Request (method, path)
//!     → shared.rs (snapshot of the live table)
//!     → router.rs (lookup)
//!     → Matched | MethodNotAllowed | NotFound
//! ```
//!
//! # Design Decisions
//! - Tables are never mutated after build; reload replaces them whole
//! - Deterministic: same input always matches same route
//! - Literal paths before parameterized ones, then declaration order

pub mod matcher;
pub mod router;
pub mod shared;

pub use matcher::PathPattern;
pub use router::{Lookup, RouteResponse, RouteTable};
pub use shared::{ReloadGuard, ReloadState, SharedRouteTable};
