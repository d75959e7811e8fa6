//! Lookup outcomes and status discriminators.

use serde::Serialize;

use crate::router::chain::Chain;
use crate::router::error::FindError;

/// Abstract result class of a lookup.
///
/// Mapping these to protocol status codes is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Found,
    NotFound,
    MethodNotAllowed,
    Internal,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Found => "found",
            Status::NotFound => "not_found",
            Status::MethodNotAllowed => "method_not_allowed",
            Status::Internal => "internal",
        }
    }
}

/// A chain that matched, with its freshly bound parameter record.
#[derive(Debug)]
pub struct Match<'a, P> {
    pub chain: &'a Chain<P>,
    pub params: P,
    /// True when no chain matched literally and the default chain was used.
    pub fallback: bool,
    /// Segments beyond the chain's tokens.
    pub tail: Vec<String>,
}

/// What a chain set lookup returns.
pub type Lookup<'a, P> = Result<Option<Match<'a, P>>, FindError>;

/// Status discriminator of a lookup result.
pub trait LookupStatus {
    fn status(&self) -> Status;
}

impl<P> LookupStatus for Lookup<'_, P> {
    fn status(&self) -> Status {
        match self {
            Ok(Some(_)) => Status::Found,
            Ok(None) => Status::NotFound,
            Err(e) => e.status(),
        }
    }
}
