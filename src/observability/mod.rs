//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, loader and HTTP adapter produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (lookup and preparation counters)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The router core only emits `tracing` events; subscribers live here
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
