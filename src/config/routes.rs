//! Building prepared endpoints from a route file.
//!
//! # Responsibilities
//! - Turn each endpoint declaration into a prepared `MethodSet`
//! - Resolve a request path to its endpoint by longest prefix
//! - Split the remainder of the path into percent-decoded segments
//!
//! # Design Decisions
//! - Every endpoint is built even when an earlier one fails, so one pass
//!   reports every broken endpoint
//! - Disabled chains become empty slots and are dropped by preparation
//! - Parameter records are `DynParams` built from the declared field kinds

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::config::schema::{ChainConfig, EndpointConfig, RoutesConfig};
use crate::config::validation::normalize_prefix;
use crate::observability::metrics;
use crate::router::{
    Chain, ChainSet, ConfigIssue, DynParams, FieldKind, MethodSet, ParamSchema, PrepareError,
    Token, DISCARD,
};

/// An endpoint whose chain sets could not be prepared.
#[derive(Debug, Error)]
#[error("endpoint {prefix}: {source}")]
pub struct EndpointError {
    pub prefix: String,
    #[source]
    pub source: PrepareError,
}

/// Prepared endpoints, ordered for longest-prefix resolution.
#[derive(Debug, Default)]
pub struct Endpoints {
    entries: Vec<(String, MethodSet<DynParams>)>,
}

impl Endpoints {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prefixes in resolution order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(prefix, _)| prefix.as_str())
    }

    pub fn get(&self, prefix: &str) -> Option<&MethodSet<DynParams>> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, set)| set)
    }

    /// Find the endpoint serving `path` and the segments left for its chains.
    ///
    /// The longest prefix ending at a segment boundary wins.
    pub fn resolve<'a, 'p>(
        &'a self,
        path: &'p str,
    ) -> Option<(&'a str, &'a MethodSet<DynParams>, Vec<Cow<'p, str>>)> {
        self.entries.iter().find_map(|(prefix, set)| {
            strip_prefix(path, prefix).map(|rest| (prefix.as_str(), set, split_segments(rest)))
        })
    }
}

fn strip_prefix<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    if prefix == "/" {
        return Some(path);
    }
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Split a path remainder into segments.
///
/// Leading and trailing slashes are ignored, so an empty remainder has no
/// segments. Each segment is percent-decoded after splitting; an escaped
/// `%2F` stays inside its segment.
pub fn split_segments(rest: &str) -> Vec<Cow<'_, str>> {
    let rest = rest.trim_matches('/');
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/')
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy())
        .collect()
}

/// Build and prepare every endpoint of a route file.
pub fn build_endpoints(config: &RoutesConfig) -> Result<Endpoints, Vec<EndpointError>> {
    let mut entries = Vec::with_capacity(config.endpoints.len());
    let mut errors = Vec::new();

    for endpoint in &config.endpoints {
        let prefix = normalize_prefix(&endpoint.prefix);
        match build_endpoint(&prefix, endpoint) {
            Ok(set) => entries.push((prefix, set)),
            Err(source) => {
                tracing::warn!(prefix = %prefix, error = %source, "Endpoint failed to prepare");
                metrics::record_prepare_failure(&prefix);
                errors.push(EndpointError { prefix, source });
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    entries.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    tracing::info!(endpoints = entries.len(), "Endpoints prepared");
    Ok(Endpoints { entries })
}

fn build_endpoint(prefix: &str, config: &EndpointConfig) -> Result<MethodSet<DynParams>, PrepareError> {
    let schema = dynamic_schema(prefix, &config.params);
    let mut set = MethodSet::new()
        .summary(config.summary.as_str())
        .describe(config.description.as_str());

    for (method, method_config) in &config.methods {
        let mut chains = ChainSet::new(schema.clone())
            .summary(method_config.summary.as_str())
            .describe(method_config.description.as_str())
            .describe_params(method_config.params_description.as_str());

        for chain in &method_config.chains {
            let slot = chain.enabled.then(|| build_chain(prefix, chain));
            chains.push_slot(slot)?;
        }
        if set.insert(method, chains).is_some() {
            return Err(ConfigIssue::DuplicateMethod(method.to_ascii_uppercase()).into());
        }
    }

    set.prepare()?;
    Ok(set)
}

fn build_chain(prefix: &str, config: &ChainConfig) -> Chain<DynParams> {
    let mut chain = Chain::new(config.name.as_str())
        .summary(config.summary.as_str())
        .describe(config.description.as_str())
        .scope(config.scope.as_str());

    if config.default {
        chain = chain.fallback();
    }
    if config.tail {
        chain = chain.with_tail();
    }
    if let Some(params) = &config.params {
        chain = chain.with_schema(dynamic_schema(&format!("{prefix}#{}", config.name), params));
    }

    for token in &config.tokens {
        let built = if token.var == DISCARD {
            Token::discard(token.expr.as_str())
        } else {
            Token::new(token.expr.as_str(), token.var.as_str())
        };
        chain = chain.push(built.describe(token.description.as_str()));
    }
    chain
}

fn dynamic_schema(name: &str, params: &BTreeMap<String, String>) -> Arc<ParamSchema<DynParams>> {
    ParamSchema::dynamic(
        name,
        params
            .iter()
            .map(|(field, kind)| (field.as_str(), FieldKind::from_name(kind))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::parse_config;
    use crate::config::schema::{MethodConfig, TokenConfig};
    use crate::router::{Dispatch, ParamValue};

    const ROUTES: &str = r#"
[[endpoints]]
prefix = "/users"
params = { Tp = "string", ID = "u64" }

[[endpoints.methods.get.chains]]
name = "by-id"
tokens = [{ expr = '\d+', var = "ID" }]

[[endpoints.methods.get.chains]]
name = "by-type"
tokens = [{ expr = "a|b", var = "Tp" }, { expr = ".*", var = "_" }]

[[endpoints.methods.get.chains]]
name = "off"
enabled = false
tokens = [{ expr = "x", var = "Nope" }]

[[endpoints]]
prefix = "/"
params = { Rest = "string" }

[[endpoints.methods.GET.chains]]
name = "anything"
default = true
tail = true
tokens = [{ expr = ".*", var = "Rest" }]
"#;

    fn endpoints() -> Endpoints {
        build_endpoints(&parse_config(ROUTES).unwrap()).unwrap()
    }

    #[test]
    fn test_split_segments() {
        assert!(split_segments("").is_empty());
        assert_eq!(split_segments("a/b"), vec!["a", "b"]);
        assert_eq!(split_segments("a/"), vec!["a"]);
        assert_eq!(split_segments("/a/b/"), vec!["a", "b"]);
        assert!(split_segments("///").is_empty());
        assert_eq!(split_segments("a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_split_segments_decodes_escapes() {
        assert_eq!(split_segments("a%20b/c"), vec!["a b", "c"]);
        assert_eq!(split_segments("x%2Fy"), vec!["x/y"]);
        assert!(matches!(split_segments("plain")[0], Cow::Borrowed("plain")));
    }

    #[test]
    fn test_trailing_slash_resolves_like_bare_path() {
        let endpoints = endpoints();

        let (_, _, segments) = endpoints.resolve("/users/24/").unwrap();
        assert_eq!(segments, vec!["24"]);

        let (_, users, segments) = endpoints.resolve("/users/a/zz/").unwrap();
        let Dispatch::Lookup(Ok(Some(found))) = users.find("GET", &segments) else {
            panic!("expected a match");
        };
        assert_eq!(found.chain.name(), "by-type");
    }

    #[test]
    fn test_duplicate_method_fails_build() {
        let chain = |name: &str, expr: &str| ChainConfig {
            name: name.to_string(),
            summary: String::new(),
            description: String::new(),
            scope: String::new(),
            default: false,
            tail: false,
            enabled: true,
            params: None,
            tokens: vec![TokenConfig {
                expr: expr.to_string(),
                var: "ID".to_string(),
                description: String::new(),
            }],
        };

        let mut methods = BTreeMap::new();
        for (method, name, expr) in [("GET", "by-id", r"\d+"), ("get", "by-name", "[a-z]+")] {
            methods.insert(
                method.to_string(),
                MethodConfig {
                    chains: vec![chain(name, expr)],
                    ..Default::default()
                },
            );
        }

        let mut config = RoutesConfig::default();
        config.endpoints.push(EndpointConfig {
            prefix: "/users".to_string(),
            summary: String::new(),
            description: String::new(),
            params: BTreeMap::from([("ID".to_string(), "string".to_string())]),
            methods,
        });

        let errors = build_endpoints(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0].source.issues(),
            [ConfigIssue::DuplicateMethod(method)] if method == "GET"
        ));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let endpoints = endpoints();
        assert_eq!(endpoints.prefixes().collect::<Vec<_>>(), vec!["/users", "/"]);

        let (prefix, _, segments) = endpoints.resolve("/users/24").unwrap();
        assert_eq!(prefix, "/users");
        assert_eq!(segments, vec!["24"]);

        let (prefix, _, segments) = endpoints.resolve("/users").unwrap();
        assert_eq!(prefix, "/users");
        assert!(segments.is_empty());

        // Not a segment boundary.
        let (prefix, _, segments) = endpoints.resolve("/usersx/1").unwrap();
        assert_eq!(prefix, "/");
        assert_eq!(segments, vec!["usersx", "1"]);
    }

    #[test]
    fn test_built_chains_dispatch() {
        let endpoints = endpoints();
        let users = endpoints.get("/users").unwrap();
        assert_eq!(users.methods().collect::<Vec<_>>(), vec!["GET"]);

        let Dispatch::Lookup(Ok(Some(found))) = users.find("GET", &["24"]) else {
            panic!("expected a match");
        };
        assert_eq!(found.chain.name(), "by-id");
        assert_eq!(found.params.get("ID"), Some(&ParamValue::Unsigned(24)));

        let Dispatch::Lookup(Ok(Some(found))) = users.find("GET", &["a", "ignored"]) else {
            panic!("expected a match");
        };
        assert_eq!(found.chain.name(), "by-type");
        assert_eq!(found.params.str("Tp"), Some("a"));

        assert!(matches!(users.find("GET", &["c"]), Dispatch::Lookup(Ok(None))));
        assert!(matches!(users.find("POST", &["24"]), Dispatch::MethodNotAllowed));
    }

    #[test]
    fn test_all_broken_endpoints_reported() {
        let config = parse_config(
            r#"
[[endpoints]]
prefix = "/a"
params = { ID = "u64" }
[[endpoints.methods.GET.chains]]
name = "bad"
tokens = [{ expr = "x", var = "Missing" }]

[[endpoints]]
prefix = "/b"
params = { F = "float" }
[[endpoints.methods.GET.chains]]
name = "bad"
tokens = [{ expr = "x", var = "F" }]
"#,
        )
        .unwrap();

        let errors = build_endpoints(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].prefix, "/a");
        assert!(matches!(
            errors[0].source.issues()[0],
            ConfigIssue::Method { .. }
        ));
        assert!(errors[1].to_string().starts_with("endpoint /b: GET: "));
    }

    #[test]
    fn test_chain_params_override() {
        let config = parse_config(
            r#"
[[endpoints]]
prefix = "/items"
params = { ID = "u64" }
[[endpoints.methods.GET.chains]]
name = "by-name"
params = { Name = "string" }
tokens = [{ expr = "[a-z]+", var = "Name" }]
"#,
        )
        .unwrap();

        let endpoints = build_endpoints(&config).unwrap();
        let items = endpoints.get("/items").unwrap();
        let Dispatch::Lookup(Ok(Some(found))) = items.find("GET", &["pen"]) else {
            panic!("expected a match");
        };
        assert_eq!(found.params.str("Name"), Some("pen"));
        assert_eq!(found.params.get("ID"), None);
    }
}
