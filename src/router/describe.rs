//! Serializable self-descriptions of endpoints.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::router::chain::Chain;
use crate::router::chain_set::ChainSet;
use crate::router::token::Token;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDescription {
    pub summary: String,
    pub description: String,
    pub methods: BTreeMap<String, ChainSetDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSetDescription {
    pub summary: String,
    pub description: String,
    pub params_description: String,
    /// Field name to field kind of the standard parameter schema.
    pub params: BTreeMap<String, String>,
    pub chains: Vec<ChainDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescription {
    pub name: String,
    pub summary: String,
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,
    pub default: bool,
    pub tail: bool,
    pub tokens: Vec<TokenDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDescription {
    pub expr: String,
    pub var_name: String,
    pub description: String,
}

impl From<&Token> for TokenDescription {
    fn from(token: &Token) -> Self {
        Self {
            expr: token.pattern().to_string(),
            var_name: token.dest().to_string(),
            description: token.description().to_string(),
        }
    }
}

impl<P> From<&Chain<P>> for ChainDescription {
    fn from(chain: &Chain<P>) -> Self {
        Self {
            name: chain.name().to_string(),
            summary: chain.summary_text().to_string(),
            description: chain.description().to_string(),
            scope: chain.scope_name().to_string(),
            default: chain.is_default(),
            tail: chain.is_tail_enabled(),
            tokens: chain.tokens().iter().map(TokenDescription::from).collect(),
        }
    }
}

impl<P> From<&ChainSet<P>> for ChainSetDescription {
    fn from(set: &ChainSet<P>) -> Self {
        Self {
            summary: set.summary.clone(),
            description: set.description.clone(),
            params_description: set.params_description.clone(),
            params: set
                .schema()
                .fields()
                .map(|(name, kind)| (name.to_string(), kind.to_string()))
                .collect(),
            chains: set.chains().map(ChainDescription::from).collect(),
        }
    }
}
