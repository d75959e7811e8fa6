//! Chains of one dispatch method.
//!
//! # Responsibilities
//! - Collect chains while the set is being built
//! - Prepare once: compact, validate, compile and sort by precedence
//! - Find the chain for a segment list and bind its parameters
//!
//! # Design Decisions
//! - Two phases: mutable until `prepare`, read-only afterwards, so `find`
//!   takes `&self` and needs no locking
//! - Precedence: non-default before default, fewer tokens before more,
//!   non-empty first pattern before empty, then registration order
//! - A failed `prepare` leaves the set unprepared and reports every issue
//! - Conversion failures discard the match instead of returning a
//!   partially bound record

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::router::chain::Chain;
use crate::router::error::{ConfigIssue, FindError, PrepareError};
use crate::router::outcome::{Lookup, Match};
use crate::router::schema::ParamSchema;

/// All chains registered for one dispatch method.
pub struct ChainSet<P> {
    pub(crate) summary: String,
    pub(crate) description: String,
    pub(crate) params_description: String,
    schema: Arc<ParamSchema<P>>,
    slots: Vec<Option<Chain<P>>>,
    chains: Vec<Chain<P>>,
    declared: BTreeSet<String>,
    prepared: bool,
}

impl<P> ChainSet<P> {
    /// Create an empty set whose chains bind into `schema` unless they
    /// bring their own.
    pub fn new(schema: Arc<ParamSchema<P>>) -> Self {
        Self {
            summary: String::new(),
            description: String::new(),
            params_description: String::new(),
            schema,
            slots: Vec::new(),
            chains: Vec::new(),
            declared: BTreeSet::new(),
            prepared: false,
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn describe_params(mut self, description: impl Into<String>) -> Self {
        self.params_description = description.into();
        self
    }

    /// Builder form of [`ChainSet::push`] for sets assembled in one go.
    ///
    /// A chain offered after preparation is dropped with a warning; use
    /// `push` to observe that as an error.
    pub fn chain(mut self, chain: Chain<P>) -> Self {
        let name = chain.name.clone();
        if let Err(issue) = self.push(chain) {
            tracing::warn!(chain = %name, %issue, "Chain dropped by builder");
        }
        self
    }

    /// Register a chain.
    pub fn push(&mut self, chain: Chain<P>) -> Result<(), ConfigIssue> {
        self.push_slot(Some(chain))
    }

    /// Register a chain slot that may be empty.
    ///
    /// Empty slots come from conditional registration and are dropped
    /// while preparing.
    pub fn push_slot(&mut self, slot: Option<Chain<P>>) -> Result<(), ConfigIssue> {
        if self.prepared {
            return Err(ConfigIssue::AlreadyPrepared);
        }
        if let Some(chain) = &slot {
            self.declared.extend(
                chain
                    .tokens
                    .iter()
                    .filter(|t| !t.is_discard() && !t.dest.is_empty())
                    .map(|t| t.dest.clone()),
            );
        }
        self.slots.push(slot);
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// True when no slot, empty or not, has been registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.chains.is_empty()
    }

    /// Destination names used by any registered chain.
    pub fn declared_names(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    pub fn schema(&self) -> &Arc<ParamSchema<P>> {
        &self.schema
    }

    /// Chains in precedence order once prepared, registration order before.
    pub fn chains(&self) -> Box<dyn Iterator<Item = &Chain<P>> + '_> {
        if self.prepared {
            Box::new(self.chains.iter())
        } else {
            Box::new(self.slots.iter().flatten())
        }
    }

    /// Validate, compile and sort the chains. Callable once.
    pub fn prepare(&mut self) -> Result<(), PrepareError> {
        if self.prepared {
            return Err(ConfigIssue::AlreadyPrepared.into());
        }

        let mut chains: Vec<Chain<P>> = std::mem::take(&mut self.slots)
            .into_iter()
            .flatten()
            .collect();

        let mut issues = Vec::new();
        if chains.is_empty() {
            issues.push(ConfigIssue::NoChains);
        }
        for (ci, chain) in chains.iter_mut().enumerate() {
            chain.prepare(ci, &self.schema, &mut issues);
        }

        if !issues.is_empty() {
            self.slots = chains.into_iter().map(Some).collect();
            return Err(PrepareError::new(issues));
        }

        chains.sort_by_key(|c| (c.default, c.tokens.len(), c.tokens[0].pattern.is_empty()));

        tracing::debug!(
            chains = chains.len(),
            defaults = chains.iter().filter(|c| c.default).count(),
            "Chain set prepared"
        );

        self.chains = chains;
        self.prepared = true;
        Ok(())
    }

    /// Find the chain for `segments` and bind its parameters.
    pub fn find<S: AsRef<str>>(&self, segments: &[S]) -> Lookup<'_, P> {
        if !self.prepared {
            return Err(FindError::NotPrepared);
        }

        let (chain, fallback) = match self.scan(segments) {
            Some(chain) => (chain, false),
            None => match self.chains.iter().find(|c| c.default) {
                Some(chain) => (chain, true),
                None => {
                    tracing::trace!(segments = segments.len(), "No chain matched");
                    return Ok(None);
                }
            },
        };

        let params = self.bind(chain, segments)?;
        let tail = segments
            .iter()
            .skip(chain.tokens.len())
            .map(|s| s.as_ref().to_string())
            .collect();

        tracing::trace!(chain = %chain.name, fallback, "Chain matched");

        Ok(Some(Match {
            chain,
            params,
            fallback,
            tail,
        }))
    }

    /// Walk the sorted chains; the first one satisfying every token wins.
    fn scan<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Chain<P>> {
        let ln = segments.len();

        // The empty-pattern chain sorts last among one-token chains.
        if ln == 0 {
            return self
                .chains
                .iter()
                .take_while(|c| !c.default && c.tokens.len() == 1)
                .find(|c| c.is_empty_path());
        }

        for chain in &self.chains {
            let count = chain.tokens.len();

            if count < ln && !chain.tail {
                continue;
            }

            // Sorted by length: nothing further can match exactly.
            if count > ln {
                return None;
            }

            let matched = chain
                .tokens
                .iter()
                .zip(segments)
                .all(|(token, segment)| token.matches(segment.as_ref()));

            if matched {
                return Some(chain);
            }
        }

        None
    }

    fn bind<S: AsRef<str>>(&self, chain: &Chain<P>, segments: &[S]) -> Result<P, FindError> {
        let schema = chain.schema.as_ref().unwrap_or(&self.schema);
        let mut params = schema.allocate();
        let mut errors = Vec::new();

        for (token, segment) in chain.tokens.iter().zip(segments) {
            if token.is_discard() {
                continue;
            }
            if let Err(e) = schema.bind(&mut params, &token.dest, segment.as_ref()) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(params)
        } else {
            Err(FindError::Conversion(errors))
        }
    }
}

/// Cloning yields an independent, unprepared copy.
impl<P> Clone for ChainSet<P> {
    fn clone(&self) -> Self {
        let slots = if self.prepared {
            self.chains.iter().cloned().map(Some).collect()
        } else {
            self.slots.clone()
        };
        Self {
            summary: self.summary.clone(),
            description: self.description.clone(),
            params_description: self.params_description.clone(),
            schema: self.schema.clone(),
            slots,
            chains: Vec::new(),
            declared: self.declared.clone(),
            prepared: false,
        }
    }
}

impl<P> std::fmt::Debug for ChainSet<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSet")
            .field("prepared", &self.prepared)
            .field("chains", &self.chains().collect::<Vec<_>>())
            .finish()
    }
}
