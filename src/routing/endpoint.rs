//! Endpoint descriptor.
//!
//! # Responsibilities
//! - Pair a role with a live connection handle
//! - Render a diagnostic form (`"<Role>: <handle>"`)
//!
//! # Design Decisions
//! - Immutable after construction; shared as `Arc<Endpoint>` so sessions keep
//!   their endpoint alive across reconfiguration

use std::fmt;
use std::sync::Arc;

use crate::provider::Connection;
use crate::routing::Role;

/// A connection endpoint tagged with its role.
#[derive(Debug, Clone)]
pub struct Endpoint {
    role: Role,
    label: String,
    connection: Arc<dyn Connection>,
}

impl Endpoint {
    /// Create a new endpoint.
    ///
    /// `label` identifies the target in logs and metrics (credentials redacted).
    pub fn new(role: Role, label: impl Into<String>, connection: Arc<dyn Connection>) -> Self {
        Self {
            role,
            label: label.into(),
            connection,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.connection.describe())
    }
}
