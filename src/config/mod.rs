//! Route file subsystem.
//!
//! # Data Flow
//! ```text
//! route file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → routes.rs (build chain sets, prepare, order by prefix)
//!     → Endpoints (prepared, read-only)
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads new file
//!     → validation.rs validates
//!     → receiver builds and swaps the endpoints atomically
//! ```
//!
//! # Design Decisions
//! - Endpoints are immutable once prepared; changes require a full rebuild
//! - Server and observability fields have defaults to allow minimal files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod routes;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use routes::{build_endpoints, EndpointError, Endpoints};
pub use schema::{ChainConfig, EndpointConfig, MethodConfig, RoutesConfig, TokenConfig};
