//! Path segment matchers.

use regex::Regex;

use crate::router::error::{ConfigIssue, Location};

/// Destination name of a token whose segment is matched but never bound.
pub const DISCARD: &str = "_";

/// One path segment matcher: a pattern plus the field it binds into.
#[derive(Debug)]
pub struct Token {
    pub(crate) pattern: String,
    pub(crate) dest: String,
    pub(crate) description: String,
    compiled: Option<Regex>,
}

impl Token {
    pub fn new(pattern: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            dest: dest.into(),
            description: String::new(),
            compiled: None,
        }
    }

    /// A token that must match but is not bound.
    pub fn discard(pattern: impl Into<String>) -> Self {
        Self::new(pattern, DISCARD)
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_discard(&self) -> bool {
        self.dest == DISCARD
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Compile the pattern as an anchored, group-capturing expression.
    pub(crate) fn compile(&mut self, at: Location) -> Result<(), ConfigIssue> {
        let re = Regex::new(&format!("^({})$", self.pattern)).map_err(|e| {
            ConfigIssue::InvalidPattern {
                at,
                source: Box::new(e),
            }
        })?;
        self.compiled = Some(re);
        Ok(())
    }

    /// Test a segment. An uncompiled token never matches.
    pub(crate) fn matches(&self, segment: &str) -> bool {
        self.compiled
            .as_ref()
            .map(|re| re.is_match(segment))
            .unwrap_or(false)
    }
}

/// Cloning yields an uncompiled token.
impl Clone for Token {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            dest: self.dest.clone(),
            description: self.description.clone(),
            compiled: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_pattern_is_anchored() {
        let mut token = Token::new(r"\d+", "ID");
        token.compile(Location::token(0, 0)).unwrap();
        assert!(token.matches("24"));
        assert!(!token.matches("a24"));
        assert!(!token.matches("24b"));
    }

    #[test]
    fn test_alternation_is_grouped() {
        let mut token = Token::new("active|blocked", "Status");
        token.compile(Location::token(0, 0)).unwrap();
        assert!(token.matches("active"));
        assert!(token.matches("blocked"));
        assert!(!token.matches("activeblocked"));
        assert!(!token.matches("inactive"));
    }

    #[test]
    fn test_empty_pattern_matches_only_empty_segment() {
        let mut token = Token::new("", "Tp");
        token.compile(Location::token(0, 0)).unwrap();
        assert!(token.matches(""));
        assert!(!token.matches("x"));
    }

    #[test]
    fn test_invalid_pattern_reports_location() {
        let mut token = Token::new(r"[\d+", "GID");
        let err = token.compile(Location::token(2, 1)).unwrap_err();
        assert!(err.to_string().starts_with("[2.1] "));
        assert!(!token.is_compiled());
    }

    #[test]
    fn test_clone_is_uncompiled() {
        let mut token = Token::discard("x").describe("ignored");
        token.compile(Location::token(0, 0)).unwrap();
        let copy = token.clone();
        assert!(!copy.is_compiled());
        assert!(copy.is_discard());
        assert_eq!(copy.description(), "ignored");
        assert!(!copy.matches("x"));
    }
}
