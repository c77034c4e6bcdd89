//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (config loads, reloads, requests, responses)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than preformatted lines
//! - Request ID flows from the middleware into dispatch logs

pub mod logging;

pub use logging::LogFormat;
