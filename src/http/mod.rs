//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → dispatch.rs (CORS, preflight, route lookup, 404/405)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod server;

pub use dispatch::{dispatch, DispatchError, DispatchResponse};
pub use server::{AppState, MockServer};
