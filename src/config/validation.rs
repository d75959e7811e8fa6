//! Route file validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Detect conflicting endpoint prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Chain-level problems are left to `prepare`, which reports them with
//!   chain and token positions

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RoutesConfig;

/// A semantic problem in a route file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no endpoints defined")]
    NoEndpoints,

    #[error("prefix \"{0}\" must start with '/'")]
    InvalidPrefix(String),

    #[error("prefix \"{0}\" is used by more than one endpoint")]
    DuplicatePrefix(String),

    #[error("endpoint \"{0}\" has an empty method name")]
    EmptyMethod(String),

    #[error("endpoint \"{prefix}\" declares method {method} more than once")]
    DuplicateMethod { prefix: String, method: String },

    #[error("{field} \"{value}\" is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Normalize a prefix: no trailing slash except for the root.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Validate a parsed route file.
pub fn validate_config(config: &RoutesConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    let mut seen = HashSet::new();
    for endpoint in &config.endpoints {
        if !endpoint.prefix.starts_with('/') {
            errors.push(ValidationError::InvalidPrefix(endpoint.prefix.clone()));
            continue;
        }

        let prefix = normalize_prefix(&endpoint.prefix);
        if !seen.insert(prefix.clone()) {
            errors.push(ValidationError::DuplicatePrefix(prefix.clone()));
        }

        if endpoint.methods.keys().any(|m| m.trim().is_empty()) {
            errors.push(ValidationError::EmptyMethod(prefix.clone()));
        }

        // Method names are case-insensitive once loaded.
        let mut methods = HashSet::new();
        for method in endpoint.methods.keys() {
            let upper = method.to_ascii_uppercase();
            if !methods.insert(upper.clone()) {
                errors.push(ValidationError::DuplicateMethod {
                    prefix: prefix.clone(),
                    method: upper,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
