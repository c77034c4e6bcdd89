//! Hot-reloading HTTP mock server library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod reload;
pub mod routing;

pub use config::ServerConfig;
pub use http::MockServer;
pub use lifecycle::Shutdown;
pub use reload::ReloadController;
pub use routing::{RouteTable, SharedRouteTable};
