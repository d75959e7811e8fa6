//! Router error definitions.
//!
//! # Design Decisions
//! - Configuration problems are collected, never fail-fast: one `prepare`
//!   reports every issue it found through [`PrepareError`]
//! - Lookup failures are local to one request and carry a status
//!   discriminator so callers never inspect error text

use std::fmt;

use thiserror::Error;

use crate::router::outcome::Status;

/// Position of a configuration problem inside a chain set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub chain: usize,
    pub token: Option<usize>,
}

impl Location {
    pub fn chain(chain: usize) -> Self {
        Self { chain, token: None }
    }

    pub fn token(chain: usize, token: usize) -> Self {
        Self {
            chain,
            token: Some(token),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.token {
            Some(token) => write!(f, "[{}.{}]", self.chain, token),
            None => write!(f, "[{}]", self.chain),
        }
    }
}

/// A single configuration problem found while building or preparing.
#[derive(Debug, Error)]
pub enum ConfigIssue {
    #[error("already prepared")]
    AlreadyPrepared,

    #[error("chain set is empty")]
    NoChains,

    #[error("method {0} is registered more than once")]
    DuplicateMethod(String),

    #[error("{at} chain is empty")]
    EmptyChain { at: Location },

    #[error("{at} empty destination name")]
    EmptyDestination { at: Location },

    #[error("{at} field \"{name}\" not found in parameter schema")]
    UnknownField { at: Location, name: String },

    #[error("{at} field \"{name}\" is not a string or integer ({kind})")]
    UnsupportedField {
        at: Location,
        name: String,
        kind: String,
    },

    #[error("{at} an empty expression is allowed only in a chain of one element")]
    MisplacedEmptyPattern { at: Location },

    #[error("{at} {source}")]
    InvalidPattern {
        at: Location,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("illegal chain index {0}")]
    IllegalIndex(usize),

    #[error("empty destination for \"{pattern}\"")]
    EmptySinkDestination { pattern: String },

    #[error("{method}: {issue}")]
    Method {
        method: String,
        issue: Box<ConfigIssue>,
    },
}

/// All issues reported by one `prepare` call.
#[derive(Debug, Error)]
pub struct PrepareError {
    issues: Vec<ConfigIssue>,
}

impl PrepareError {
    pub(crate) fn new(issues: Vec<ConfigIssue>) -> Self {
        Self { issues }
    }

    /// Turn a non-empty issue list into an error.
    pub(crate) fn check(issues: Vec<ConfigIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::new(issues))
        }
    }

    /// Attach the dispatch method every issue belongs to.
    pub(crate) fn scoped(self, method: &str) -> Self {
        let issues = self
            .issues
            .into_iter()
            .map(|issue| ConfigIssue::Method {
                method: method.to_string(),
                issue: Box::new(issue),
            })
            .collect();
        Self { issues }
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ConfigIssue> {
        self.issues
    }
}

impl From<ConfigIssue> for PrepareError {
    fn from(issue: ConfigIssue) -> Self {
        Self::new(vec![issue])
    }
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, &self.issues)
    }
}

/// A path segment that could not be converted into its destination field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: cannot convert \"{value}\" to {expected}: {reason}")]
pub struct ConversionError {
    pub name: String,
    pub value: String,
    pub expected: &'static str,
    pub reason: String,
}

/// Problems with caller-supplied sinks in the sink-binding variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkIssue {
    #[error("unknown variable \"{0}\"")]
    Unknown(String),

    #[error("duplicated variable \"{0}\"")]
    Duplicate(String),

    #[error("not handled variable \"{0}\"")]
    NotHandled(String),
}

/// Errors returned by a lookup.
#[derive(Debug, Error)]
pub enum FindError {
    #[error("not prepared")]
    NotPrepared,

    #[error("{}", Joined(.0))]
    Conversion(Vec<ConversionError>),

    #[error("{}", Joined(.0))]
    Sinks(Vec<SinkIssue>),
}

impl FindError {
    /// Status discriminator reported alongside this error.
    pub fn status(&self) -> Status {
        match self {
            FindError::NotPrepared => Status::Internal,
            FindError::Conversion(_) | FindError::Sinks(_) => Status::NotFound,
        }
    }
}

struct Joined<'a, T>(&'a [T]);

impl<T: fmt::Display> fmt::Display for Joined<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        join(f, self.0)
    }
}

fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "; ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}
