//! Path-chain router library.
//!
//! `router` is the engine: chain sets matched segment by segment against
//! anchored patterns, with parameters bound into typed records. The other
//! modules load route files, serve lookups over HTTP and report through
//! tracing and metrics.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod router;

pub use config::schema::RoutesConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
