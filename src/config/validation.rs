//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every target is addressable (host, port, database)
//! - Validate value ranges (timeouts > 0, parseable addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ConnectionTarget, RouterConfig};
use crate::routing::Role;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{target}: host is empty")]
    EmptyHost { target: String },

    #[error("{target}: port must be non-zero")]
    ZeroPort { target: String },

    #[error("{target}: database name is empty")]
    EmptyDatabase { target: String },

    #[error("timeouts.connect_secs must be greater than zero")]
    ZeroConnectTimeout,

    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),

    #[error("observability.log_level is not a known level: {0}")]
    InvalidLogLevel(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_target(&config.database.primary, Role::Primary, 0, &mut errors);
    for (index, replica) in config.database.replicas.iter().enumerate() {
        validate_target(replica, Role::Replica, index, &mut errors);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(observability.metrics_address.clone()));
    }
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_target(target: &ConnectionTarget, role: Role, index: usize, errors: &mut Vec<ValidationError>) {
    let name = match role {
        Role::Primary => "database.primary".to_string(),
        Role::Replica => format!("database.replicas[{}]", index),
    };

    if target.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost { target: name.clone() });
    }
    if target.port == 0 {
        errors.push(ValidationError::ZeroPort { target: name.clone() });
    }
    if target.database.trim().is_empty() {
        errors.push(ValidationError::EmptyDatabase { target: name });
    }
}
