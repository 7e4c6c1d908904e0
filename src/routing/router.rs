//! Role-aware endpoint router.
//!
//! # Responsibilities
//! - Store registered endpoints in insertion order
//! - Keep one round-robin cursor per role
//! - Select an endpoint for a read or write intent
//! - Open sessions on the selected endpoint
//!
//! # Design Decisions
//! - Registration takes `&mut self`: once the router sits behind an `Arc`
//!   the endpoint list cannot change, only the cursors move
//! - Primary and replica cursors are independent

use std::sync::Arc;

use crate::error::{RouterError, RouterResult};
use crate::load_balancer::{BalancingMode, Cursor};
use crate::observability::metrics;
use crate::routing::{Endpoint, Role};
use crate::session::Session;

/// Routes units of work to primary or replica endpoints.
#[derive(Debug, Default)]
pub struct Router {
    mode: BalancingMode,
    endpoints: Vec<Arc<Endpoint>>,
    primary_cursor: Cursor,
    replica_cursor: Cursor,
}

impl Router {
    /// Create an empty router with the given balancing mode.
    pub fn new(mode: BalancingMode) -> Self {
        Self {
            mode,
            endpoints: Vec::new(),
            primary_cursor: Cursor::new(),
            replica_cursor: Cursor::new(),
        }
    }

    /// Register an endpoint. Duplicates are not checked.
    pub fn add_endpoint(&mut self, endpoint: Endpoint) {
        tracing::debug!(role = %endpoint.role(), endpoint = %endpoint.label(), "Registering endpoint");
        self.endpoints.push(Arc::new(endpoint));
    }

    /// All registered endpoints, in insertion order.
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    /// Endpoints with the primary role, in insertion order.
    pub fn primary_endpoints(&self) -> Vec<Arc<Endpoint>> {
        self.endpoints_with_role(Role::Primary)
    }

    /// Endpoints with the replica role, in insertion order.
    pub fn replica_endpoints(&self) -> Vec<Arc<Endpoint>> {
        self.endpoints_with_role(Role::Replica)
    }

    pub fn mode(&self) -> BalancingMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Select an endpoint for the given intent.
    ///
    /// Writes select among primaries, reads among replicas. An empty role
    /// yields [`RouterError::NoEligibleEndpoint`]; the other role is never used
    /// as a substitute.
    pub fn select_endpoint(&self, for_write: bool) -> RouterResult<Arc<Endpoint>> {
        let role = Role::for_write(for_write);
        let candidates = self.endpoints_with_role(role);
        let cursor = match role {
            Role::Primary => &self.primary_cursor,
            Role::Replica => &self.replica_cursor,
        };

        let Some(endpoint) = self.mode.select(cursor, &candidates) else {
            tracing::debug!(role = %role, registered = self.endpoints.len(), "No endpoint with requested role");
            return Err(RouterError::NoEligibleEndpoint { role });
        };

        metrics::record_selection(role, self.mode);
        tracing::trace!(role = %role, mode = %self.mode, endpoint = %endpoint.label(), "Endpoint selected");
        Ok(endpoint.clone())
    }

    /// Select an endpoint and open a new session on it.
    pub async fn open_session(&self, for_write: bool) -> RouterResult<Session> {
        let endpoint = self.select_endpoint(for_write)?;
        Session::open(endpoint).await
    }

    fn endpoints_with_role(&self, role: Role) -> Vec<Arc<Endpoint>> {
        self.endpoints
            .iter()
            .filter(|e| e.role() == role)
            .cloned()
            .collect()
    }
}
