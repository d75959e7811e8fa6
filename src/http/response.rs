//! Response bodies and status mapping.
//!
//! # Responsibilities
//! - Map lookup outcomes to HTTP status codes
//! - Shape JSON bodies for matches, descriptions and errors

use axum::http::StatusCode;
use serde::Serialize;

use crate::router::{DynParams, Match, SetDescription, Status};

/// HTTP status for a lookup outcome.
pub fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Found => StatusCode::OK,
        Status::NotFound => StatusCode::NOT_FOUND,
        Status::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        Status::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A matched chain as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBody {
    pub chain: String,
    pub fallback: bool,
    pub params: DynParams,
    pub tail: Vec<String>,
}

impl From<Match<'_, DynParams>> for MatchBody {
    fn from(found: Match<'_, DynParams>) -> Self {
        Self {
            chain: found.chain.name().to_string(),
            fallback: found.fallback,
            params: found.params,
            tail: found.tail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RouteBody {
    Match(MatchBody),
    Describe(SetDescription),
    Error { error: String },
}

impl RouteBody {
    pub fn error(message: impl Into<String>) -> Self {
        RouteBody::Error {
            error: message.into(),
        }
    }
}
