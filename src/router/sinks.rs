//! Chain sets that bind into caller-supplied sinks.
//!
//! # Responsibilities
//! - Build chains incrementally, possibly from several threads
//! - Resolve a path and write bound values into typed sinks owned by the
//!   caller instead of allocating a parameter record
//!
//! # Design Decisions
//! - The lock only serializes writers before preparation and rejects them
//!   afterwards; lookups take the read side
//! - Every declared destination needs exactly one sink, and only declared
//!   destinations may have one. Violations report no match
//! - Values are checked before any sink is written

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use crate::router::binder::parse_integer;
use crate::router::error::{
    ConfigIssue, ConversionError, FindError, Location, PrepareError, SinkIssue,
};
use crate::router::token::{Token, DISCARD};

/// A typed destination owned by the caller.
#[derive(Debug)]
pub enum Sink<'a> {
    Str(&'a mut String),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
}

macro_rules! sink_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl<'a> From<&'a mut $ty> for Sink<'a> {
            fn from(slot: &'a mut $ty) -> Self {
                Sink::$variant(slot)
            }
        })*
    };
}

sink_from! {
    String => Str,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
}

impl Sink<'_> {
    /// Convert `text` and, when `write` is set, store it.
    fn apply(&mut self, name: &str, text: &str, write: bool) -> Result<(), ConversionError> {
        macro_rules! int {
            ($slot:expr, $ty:ty) => {{
                let v = parse_integer::<$ty>(name, text)?;
                if write {
                    **$slot = v;
                }
            }};
        }

        match self {
            Sink::Str(slot) => {
                if write {
                    **slot = text.to_string();
                }
            }
            Sink::I8(slot) => int!(slot, i8),
            Sink::I16(slot) => int!(slot, i16),
            Sink::I32(slot) => int!(slot, i32),
            Sink::I64(slot) => int!(slot, i64),
            Sink::Isize(slot) => int!(slot, isize),
            Sink::U8(slot) => int!(slot, u8),
            Sink::U16(slot) => int!(slot, u16),
            Sink::U32(slot) => int!(slot, u32),
            Sink::U64(slot) => int!(slot, u64),
            Sink::Usize(slot) => int!(slot, usize),
        }
        Ok(())
    }
}

/// Named sinks for one lookup.
#[derive(Debug, Default)]
pub struct Sinks<'a> {
    slots: BTreeMap<String, Sink<'a>>,
    duplicates: Vec<String>,
}

impl<'a> Sinks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, sink: impl Into<Sink<'a>>) -> Self {
        self.insert(name, sink);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, sink: impl Into<Sink<'a>>) {
        let name = name.into();
        if self.slots.contains_key(&name) {
            self.duplicates.push(name);
            return;
        }
        self.slots.insert(name, sink.into());
    }
}

#[derive(Default)]
struct Inner {
    prepared: bool,
    chains: Vec<Vec<Token>>,
    known: BTreeSet<String>,
}

/// A chain set built incrementally and bound through [`Sinks`].
#[derive(Default)]
pub struct SinkChainSet {
    inner: RwLock<Inner>,
}

impl SinkChainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new chain and return its index.
    pub fn new_chain(&self) -> Result<usize, ConfigIssue> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.prepared {
            return Err(ConfigIssue::AlreadyPrepared);
        }
        inner.chains.push(Vec::new());
        Ok(inner.chains.len() - 1)
    }

    /// Append a token to the chain at `index`.
    pub fn add(&self, index: usize, pattern: &str, dest: &str) -> Result<(), ConfigIssue> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.prepared {
            return Err(ConfigIssue::AlreadyPrepared);
        }
        if index >= inner.chains.len() {
            return Err(ConfigIssue::IllegalIndex(index));
        }
        if dest.is_empty() {
            return Err(ConfigIssue::EmptySinkDestination {
                pattern: pattern.to_string(),
            });
        }

        inner.chains[index].push(Token::new(pattern, dest));
        if dest != DISCARD {
            inner.known.insert(dest.to_string());
        }
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .prepared
    }

    /// Compile and sort. After this, writers are rejected.
    pub fn prepare(&self) -> Result<(), PrepareError> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.prepared {
            return Err(ConfigIssue::AlreadyPrepared.into());
        }
        if inner.chains.is_empty() {
            return Err(ConfigIssue::NoChains.into());
        }

        let mut issues = Vec::new();
        for (ci, tokens) in inner.chains.iter_mut().enumerate() {
            if tokens.is_empty() {
                issues.push(ConfigIssue::EmptyChain {
                    at: Location::chain(ci),
                });
                continue;
            }
            let single = tokens.len() == 1;
            for (ti, token) in tokens.iter_mut().enumerate() {
                let at = Location::token(ci, ti);
                if token.pattern().is_empty() && !single {
                    issues.push(ConfigIssue::MisplacedEmptyPattern { at });
                    continue;
                }
                if let Err(issue) = token.compile(at) {
                    issues.push(issue);
                }
            }
        }
        PrepareError::check(issues)?;

        inner
            .chains
            .sort_by_key(|tokens| (tokens.len(), tokens[0].pattern().is_empty()));
        inner.prepared = true;

        tracing::debug!(chains = inner.chains.len(), "Sink chain set prepared");
        Ok(())
    }

    /// Resolve `segments`, writing bound values into `sinks`.
    ///
    /// Returns `Ok(false)` when no chain matches.
    pub fn resolve<S: AsRef<str>>(
        &self,
        segments: &[S],
        sinks: &mut Sinks<'_>,
    ) -> Result<bool, FindError> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        if !inner.prepared {
            return Err(FindError::NotPrepared);
        }

        let mut issues: Vec<SinkIssue> = sinks
            .duplicates
            .iter()
            .cloned()
            .map(SinkIssue::Duplicate)
            .collect();
        issues.extend(
            sinks
                .slots
                .keys()
                .filter(|name| !inner.known.contains(*name))
                .cloned()
                .map(SinkIssue::Unknown),
        );
        issues.extend(
            inner
                .known
                .iter()
                .filter(|name| !sinks.slots.contains_key(*name))
                .cloned()
                .map(SinkIssue::NotHandled),
        );
        if !issues.is_empty() {
            return Err(FindError::Sinks(issues));
        }

        let Some(tokens) = Self::scan(&inner.chains, segments) else {
            return Ok(false);
        };

        let mut errors = Vec::new();
        for write in [false, true] {
            for (token, segment) in tokens.iter().zip(segments) {
                if token.is_discard() {
                    continue;
                }
                if let Some(sink) = sinks.slots.get_mut(token.dest()) {
                    if let Err(e) = sink.apply(token.dest(), segment.as_ref(), write) {
                        errors.push(e);
                    }
                }
            }
            if !errors.is_empty() {
                return Err(FindError::Conversion(errors));
            }
        }

        Ok(true)
    }

    fn scan<'c, S: AsRef<str>>(chains: &'c [Vec<Token>], segments: &[S]) -> Option<&'c [Token]> {
        let ln = segments.len();

        if ln == 0 {
            return chains
                .iter()
                .take_while(|tokens| tokens.len() == 1)
                .find(|tokens| tokens[0].pattern().is_empty())
                .map(Vec::as_slice);
        }

        for tokens in chains {
            if tokens.len() < ln {
                continue;
            }
            if tokens.len() > ln {
                return None;
            }
            if tokens
                .iter()
                .zip(segments)
                .all(|(token, segment)| token.matches(segment.as_ref()))
            {
                return Some(tokens.as_slice());
            }
        }
        None
    }
}
