//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate prefixes, addresses and value ranges
//! - Detect traffic/admin prefix collisions
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be positive"));
    }

    check_prefix("traffic.prefix", &config.traffic.prefix, &mut errors);
    if config.admin.enabled {
        check_prefix("admin.prefix", &config.admin.prefix, &mut errors);
        if config.admin.prefix == config.traffic.prefix {
            errors.push(ValidationError::new(
                "admin.prefix",
                "must differ from traffic.prefix",
            ));
        }
    }

    if config.storage.path.trim().is_empty() {
        errors.push(ValidationError::new("storage.path", "must not be empty"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be positive"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_prefix(field: &'static str, prefix: &str, errors: &mut Vec<ValidationError>) {
    if !prefix.starts_with('/') {
        errors.push(ValidationError::new(field, "must start with '/'"));
    } else if prefix.len() == 1 || prefix.ends_with('/') {
        errors.push(ValidationError::new(field, "must not end with '/'"));
    }
}
