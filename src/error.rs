//! Router error types.
//!
//! # Design Decisions
//! - One error enum for routing, sessions and lifecycle
//! - Collaborator errors are wrapped, never swallowed or retried
//! - Selection failures name the role that had no candidates

use thiserror::Error;

use crate::routing::Role;

/// Result alias used across the crate.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors surfaced by the router, its sessions and the manager.
#[derive(Error, Debug)]
pub enum RouterError {
    /// A manager operation ran before `initialize()` completed.
    #[error("database manager is not initialized: call initialize() before {operation}()")]
    NotInitialized { operation: &'static str },

    /// `initialize()` was called on a manager that is already running.
    #[error("database manager is already initialized")]
    AlreadyInitialized,

    /// The manager was torn down.
    #[error("database manager has been disposed")]
    Disposed,

    /// No registered endpoint carries the requested role.
    #[error("no {role} endpoint available")]
    NoEligibleEndpoint { role: Role },

    /// The configured balancing mode matches none of the known policies.
    #[error("invalid balancing mode: {0}")]
    InvalidBalancingMode(String),

    /// Opening or releasing a connection failed.
    #[error("connection error ({target}): {source}")]
    Connection {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The session backend reported a failure.
    #[error("session error: {0}")]
    Session(String),

    /// The session was already closed.
    #[error("session is closed")]
    SessionClosed,

    /// Schema provisioning failed.
    #[error("schema error: {0}")]
    Schema(String),
}

impl RouterError {
    /// Build a connection error for the given target label.
    pub fn connection(target: impl Into<String>, source: std::io::Error) -> Self {
        Self::Connection {
            target: target.into(),
            source,
        }
    }

    /// Build a session error.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Build a schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// True when the error originates from a collaborator (connection or session backend).
    pub fn is_collaborator(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Session(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_names_required_call() {
        let err = RouterError::NotInitialized { operation: "acquire_session" };
        let msg = err.to_string();
        assert!(msg.contains("initialize()"));
        assert!(msg.contains("acquire_session()"));
    }

    #[test]
    fn test_no_eligible_endpoint_names_role() {
        let err = RouterError::NoEligibleEndpoint { role: Role::Replica };
        assert_eq!(err.to_string(), "no Replica endpoint available");
    }

    #[test]
    fn test_collaborator_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(RouterError::connection("db1:3306", io).is_collaborator());
        assert!(RouterError::session("broken pipe").is_collaborator());
        assert!(!RouterError::Disposed.is_collaborator());
    }
}
