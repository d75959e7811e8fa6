//! HTTP adapter.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → longest-prefix endpoint, remainder split into segments
//!     → MethodSet::find(method, segments)
//!     → response.rs (status mapping, JSON body)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
