//! Path-chain routing engine.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     Chain declarations (pattern, destination) + ParamSchema
//!     → ChainSet (one per dispatch method)
//!     → MethodSet (one per endpoint)
//!
//! Preparation (once):
//!     → drop empty slots
//!     → validate destinations, compile patterns (all issues collected)
//!     → sort by precedence
//!     → read-only from here on
//!
//! Lookup (per request):
//!     segments → first matching chain, else default chain
//!     → fresh parameter record bound from the segments
//!     → Match | not found | error with status discriminator
//! ```
//!
//! # Design Decisions
//! - Pattern matching is delegated to `regex`, anchored per token
//! - Parameter records are described by explicit schemas, not reflection
//! - Deterministic: same segments always select the same chain
//! - No internal threads or I/O; a prepared set is shared freely

pub mod binder;
pub mod chain;
pub mod chain_set;
pub mod describe;
pub mod error;
pub mod method_set;
pub mod outcome;
pub mod schema;
pub mod sinks;
pub mod token;

pub use binder::{FieldKind, IntKind, Integer, ParamValue};
pub use chain::Chain;
pub use chain_set::ChainSet;
pub use describe::SetDescription;
pub use error::{ConfigIssue, ConversionError, FindError, PrepareError, SinkIssue};
pub use method_set::{Dispatch, MethodSet};
pub use outcome::{Lookup, LookupStatus, Match, Status};
pub use schema::{DynParams, ParamSchema};
pub use sinks::{Sink, SinkChainSet, Sinks};
pub use token::{Token, DISCARD};
