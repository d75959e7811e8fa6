//! Dispatch methods of one logical endpoint.
//!
//! # Responsibilities
//! - Map method names to chain sets
//! - Prepare every chain set in one pass, reporting all issues
//! - Dispatch a lookup to the chain set of the requested method
//! - Describe the endpoint on request
//!
//! # Design Decisions
//! - Method names are stored upper-cased
//! - `PUT` and `PATCH` mirror each other: when only one is declared the
//!   other receives an unprepared clone of it before preparation
//! - Methods without any chain slot are dropped rather than reported

use std::collections::BTreeMap;

use crate::router::chain_set::ChainSet;
use crate::router::describe::{ChainSetDescription, SetDescription};
use crate::router::error::PrepareError;
use crate::router::outcome::{Lookup, LookupStatus, Status};

pub const METHOD_PUT: &str = "PUT";
pub const METHOD_PATCH: &str = "PATCH";

/// Single segment that asks an endpoint to describe itself.
pub const INFO_SEGMENT: &str = ".info";

/// Outcome of dispatching a request to a method set.
#[derive(Debug)]
pub enum Dispatch<'a, P> {
    Lookup(Lookup<'a, P>),
    Describe(SetDescription),
    MethodNotAllowed,
}

impl<P> Dispatch<'_, P> {
    pub fn status(&self) -> Status {
        match self {
            Dispatch::Lookup(lookup) => lookup.status(),
            Dispatch::Describe(_) => Status::Found,
            Dispatch::MethodNotAllowed => Status::MethodNotAllowed,
        }
    }
}

/// Chain sets of one endpoint, keyed by method.
pub struct MethodSet<P> {
    summary: String,
    description: String,
    methods: BTreeMap<String, ChainSet<P>>,
}

impl<P> MethodSet<P> {
    pub fn new() -> Self {
        Self {
            summary: String::new(),
            description: String::new(),
            methods: BTreeMap::new(),
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

    /// Builder form of [`MethodSet::insert`].
    pub fn method(mut self, method: &str, set: ChainSet<P>) -> Self {
        self.insert(method, set);
        self
    }

    /// Register the chain set of `method`, returning the one it replaces.
    pub fn insert(&mut self, method: &str, set: ChainSet<P>) -> Option<ChainSet<P>> {
        self.methods.insert(method.to_ascii_uppercase(), set)
    }

    pub fn get(&self, method: &str) -> Option<&ChainSet<P>> {
        self.methods.get(&method.to_ascii_uppercase())
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Prepare every method's chain set.
    pub fn prepare(&mut self) -> Result<(), PrepareError> {
        self.mirror(METHOD_PATCH, METHOD_PUT);
        self.mirror(METHOD_PUT, METHOD_PATCH);

        self.methods.retain(|method, set| {
            if set.is_empty() {
                tracing::debug!(method = %method, "Dropping method without chains");
            }
            !set.is_empty()
        });

        let mut issues = Vec::new();
        for (method, set) in self.methods.iter_mut() {
            if let Err(e) = set.prepare() {
                issues.extend(e.scoped(method).into_issues());
            }
        }

        PrepareError::check(issues)
    }

    fn mirror(&mut self, from: &str, to: &str) {
        if self.methods.contains_key(to) {
            return;
        }
        if let Some(source) = self.methods.get(from) {
            let copy = source.clone();
            self.methods.insert(to.to_string(), copy);
        }
    }

    /// Dispatch `segments` to the chain set of `method`.
    pub fn find<S: AsRef<str>>(&self, method: &str, segments: &[S]) -> Dispatch<'_, P> {
        let Some(set) = self.get(method) else {
            return Dispatch::MethodNotAllowed;
        };

        if let [only] = segments {
            if only.as_ref() == INFO_SEGMENT {
                return Dispatch::Describe(self.description());
            }
        }

        Dispatch::Lookup(set.find(segments))
    }

    /// Describe every method and its chains.
    pub fn description(&self) -> SetDescription {
        SetDescription {
            summary: self.summary.clone(),
            description: self.description.clone(),
            methods: self
                .methods
                .iter()
                .map(|(method, set)| (method.clone(), ChainSetDescription::from(set)))
                .collect(),
        }
    }
}

impl<P> Default for MethodSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for MethodSet<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodSet")
            .field("summary", &self.summary)
            .field("methods", &self.methods)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::router::chain::Chain;
    use crate::router::error::ConfigIssue;
    use crate::router::schema::ParamSchema;

    #[derive(Debug, Default)]
    struct Params {
        id: u64,
    }

    fn schema() -> Arc<ParamSchema<Params>> {
        Arc::new(ParamSchema::new("params").integer("ID", |p: &mut Params, v: u64| p.id = v))
    }

    fn by_id() -> ChainSet<Params> {
        ChainSet::new(schema()).chain(Chain::new("by-id").token(r"\d+", "ID"))
    }

    #[test]
    fn test_unknown_method_is_not_allowed() {
        let mut set = MethodSet::new().method("GET", by_id());
        set.prepare().unwrap();
        let dispatch = set.find("DELETE", &["1"]);
        assert!(matches!(dispatch, Dispatch::MethodNotAllowed));
        assert_eq!(dispatch.status(), Status::MethodNotAllowed);
    }

    #[test]
    fn test_method_names_are_case_insensitive() {
        let mut set = MethodSet::new().method("get", by_id());
        set.prepare().unwrap();
        match set.find("Get", &["7"]) {
            Dispatch::Lookup(Ok(Some(found))) => assert_eq!(found.params.id, 7),
            other => panic!("unexpected dispatch: {:?}", other),
        }
    }

    #[test]
    fn test_patch_mirrors_put() {
        let mut set = MethodSet::new().method("PUT", by_id());
        set.prepare().unwrap();
        assert_eq!(set.methods().collect::<Vec<_>>(), vec!["PATCH", "PUT"]);
        assert!(set.get("PATCH").unwrap().is_prepared());
        assert_eq!(set.find("PATCH", &["3"]).status(), Status::Found);
    }

    #[test]
    fn test_put_mirrors_patch() {
        let mut set = MethodSet::new().method("PATCH", by_id());
        set.prepare().unwrap();
        assert!(set.get("PUT").is_some());
    }

    #[test]
    fn test_empty_methods_are_dropped() {
        let mut set = MethodSet::new()
            .method("GET", by_id())
            .method("POST", ChainSet::new(schema()));
        set.prepare().unwrap();
        assert_eq!(set.methods().collect::<Vec<_>>(), vec!["GET"]);
    }

    #[test]
    fn test_issues_are_scoped_by_method() {
        let mut set = MethodSet::new()
            .method("GET", ChainSet::new(schema()).chain(Chain::new("bad").token(r"\d+", "X")))
            .method("DELETE", ChainSet::new(schema()).chain(Chain::new("empty")));
        let err = set.prepare().unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert!(err
            .issues()
            .iter()
            .all(|issue| matches!(issue, ConfigIssue::Method { .. })));
        let text = err.to_string();
        assert!(text.contains("DELETE: [0] chain is empty"));
        assert!(text.contains("GET: [0.0] field \"X\" not found"));
    }

    #[test]
    fn test_info_segment_describes_set() {
        let mut set = MethodSet::new()
            .summary("Users")
            .method("GET", by_id().summary("Read users"));
        set.prepare().unwrap();
        match set.find("GET", &[INFO_SEGMENT]) {
            Dispatch::Describe(description) => {
                assert_eq!(description.summary, "Users");
                let get = &description.methods["GET"];
                assert_eq!(get.summary, "Read users");
                assert_eq!(get.params["ID"], "u64");
                assert_eq!(get.chains[0].tokens[0].var_name, "ID");
            }
            other => panic!("unexpected dispatch: {:?}", other),
        }
    }
}
