//! Routable path shapes.
//!
//! # Responsibilities
//! - Hold the ordered tokens of one path shape plus its flags
//! - Validate destinations against the parameter schema
//! - Compile token patterns once, while the owning set is prepared

use std::fmt;
use std::sync::Arc;

use crate::router::error::{ConfigIssue, Location};
use crate::router::schema::ParamSchema;
use crate::router::token::Token;

/// One routable path shape.
pub struct Chain<P> {
    pub(crate) name: String,
    pub(crate) summary: String,
    pub(crate) description: String,
    pub(crate) scope: String,
    pub(crate) default: bool,
    pub(crate) tail: bool,
    pub(crate) tokens: Vec<Token>,
    pub(crate) schema: Option<Arc<ParamSchema<P>>>,
}

impl<P> Chain<P> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: String::new(),
            description: String::new(),
            scope: String::new(),
            default: false,
            tail: false,
            tokens: Vec::new(),
            schema: None,
        }
    }

    /// Append a token built from a pattern and a destination name.
    pub fn token(self, pattern: impl Into<String>, dest: impl Into<String>) -> Self {
        self.push(Token::new(pattern, dest))
    }

    pub fn push(mut self, token: Token) -> Self {
        self.tokens.push(token);
        self
    }

    /// Use this chain when nothing else matches.
    pub fn fallback(mut self) -> Self {
        self.default = true;
        self
    }

    /// Accept paths longer than the declared tokens.
    pub fn with_tail(mut self) -> Self {
        self.tail = true;
        self
    }

    /// Bind into `schema` instead of the set's standard schema.
    pub fn with_schema(mut self, schema: Arc<ParamSchema<P>>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary_text(&self) -> &str {
        &self.summary
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn scope_name(&self) -> &str {
        &self.scope
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    pub fn is_tail_enabled(&self) -> bool {
        self.tail
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn schema(&self) -> Option<&Arc<ParamSchema<P>>> {
        self.schema.as_ref()
    }

    /// Whether this is the single-empty-token chain standing for "no segments".
    pub(crate) fn is_empty_path(&self) -> bool {
        self.tokens.len() == 1 && self.tokens[0].pattern.is_empty()
    }

    /// Validate and compile, appending every problem found to `issues`.
    pub(crate) fn prepare(
        &mut self,
        index: usize,
        std_schema: &Arc<ParamSchema<P>>,
        issues: &mut Vec<ConfigIssue>,
    ) {
        let schema = self.schema.get_or_insert_with(|| std_schema.clone()).clone();

        if self.tokens.is_empty() {
            issues.push(ConfigIssue::EmptyChain {
                at: Location::chain(index),
            });
            return;
        }

        let single = self.tokens.len() == 1;

        for (ti, token) in self.tokens.iter_mut().enumerate() {
            let at = Location::token(index, ti);

            if token.dest.is_empty() {
                issues.push(ConfigIssue::EmptyDestination { at });
                continue;
            }

            if !token.is_discard() {
                let Some(field) = schema.field(&token.dest) else {
                    issues.push(ConfigIssue::UnknownField {
                        at,
                        name: token.dest.clone(),
                    });
                    continue;
                };

                if !field.kind().is_bindable() {
                    issues.push(ConfigIssue::UnsupportedField {
                        at,
                        name: token.dest.clone(),
                        kind: field.kind().to_string(),
                    });
                    continue;
                }
            }

            if token.pattern.is_empty() && !single {
                issues.push(ConfigIssue::MisplacedEmptyPattern { at });
                continue;
            }

            if let Err(issue) = token.compile(at) {
                issues.push(issue);
            }
        }
    }
}

/// Cloning yields an uncompiled chain sharing the same schema.
impl<P> Clone for Chain<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            summary: self.summary.clone(),
            description: self.description.clone(),
            scope: self.scope.clone(),
            default: self.default,
            tail: self.tail,
            tokens: self.tokens.clone(),
            schema: self.schema.clone(),
        }
    }
}

impl<P> fmt::Debug for Chain<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("tail", &self.tail)
            .field("tokens", &self.tokens)
            .field("schema", &self.schema.as_ref().map(|s| s.name()))
            .finish()
    }
}
