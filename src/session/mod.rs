//! Routed sessions.
//!
//! # Responsibilities
//! - Bind one unit of work to exactly one endpoint's connection
//! - Pass transaction control and statements through to the provider
//! - Close the provider session exactly once
//!
//! # Design Decisions
//! - `close()` is the normal path and reports errors to the caller
//! - Dropping an open session (early return, panic unwinding, cancelled
//!   future) schedules the close on the current runtime
//! - Transaction boundaries stay with the caller

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{RouterError, RouterResult};
use crate::observability::metrics;
use crate::provider::SessionBackend;
use crate::routing::{Endpoint, Role};

/// A session bound to a single endpoint.
pub struct Session {
    id: Uuid,
    endpoint: Arc<Endpoint>,
    backend: Option<Box<dyn SessionBackend>>,
    in_transaction: bool,
}

impl Session {
    /// Open a new session on the endpoint's connection.
    pub async fn open(endpoint: Arc<Endpoint>) -> RouterResult<Self> {
        let backend = endpoint.connection().open_session().await?;
        let id = Uuid::new_v4();

        metrics::record_session_opened(endpoint.role());
        tracing::debug!(session = %id, role = %endpoint.role(), endpoint = %endpoint.label(), "Session opened");

        Ok(Self {
            id,
            endpoint,
            backend: Some(backend),
            in_transaction: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn endpoint(&self) -> &Arc<Endpoint> {
        &self.endpoint
    }

    pub fn role(&self) -> Role {
        self.endpoint.role()
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Begin a transaction.
    pub async fn begin(&mut self) -> RouterResult<()> {
        if self.in_transaction {
            return Err(RouterError::session("transaction already in progress"));
        }
        self.backend_mut()?.begin().await?;
        self.in_transaction = true;
        Ok(())
    }

    /// Commit the current transaction.
    pub async fn commit(&mut self) -> RouterResult<()> {
        if !self.in_transaction {
            return Err(RouterError::session("no transaction in progress"));
        }
        self.in_transaction = false;
        self.backend_mut()?.commit().await
    }

    /// Roll back the current transaction.
    pub async fn rollback(&mut self) -> RouterResult<()> {
        if !self.in_transaction {
            return Err(RouterError::session("no transaction in progress"));
        }
        self.in_transaction = false;
        self.backend_mut()?.rollback().await
    }

    /// Execute a statement on the bound endpoint.
    pub async fn execute(&mut self, statement: &str) -> RouterResult<u64> {
        self.backend_mut()?.execute(statement).await
    }

    /// Close the session. Calling it again is a no-op.
    pub async fn close(&mut self) -> RouterResult<()> {
        let Some(mut backend) = self.backend.take() else {
            return Ok(());
        };
        self.in_transaction = false;

        metrics::record_session_closed(self.endpoint.role());
        tracing::debug!(session = %self.id, endpoint = %self.endpoint.label(), "Session closed");
        backend.close().await
    }

    fn backend_mut(&mut self) -> RouterResult<&mut Box<dyn SessionBackend>> {
        self.backend.as_mut().ok_or(RouterError::SessionClosed)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint.label())
            .field("closed", &self.is_closed())
            .field("in_transaction", &self.in_transaction)
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let Some(mut backend) = self.backend.take() else {
            return;
        };

        let id = self.id;
        let role = self.endpoint.role();
        let label = self.endpoint.label().to_string();
        metrics::record_session_closed(role);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(session = %id, endpoint = %label, "Session dropped while open, closing in background");
                handle.spawn(async move {
                    if let Err(e) = backend.close().await {
                        tracing::warn!(session = %id, endpoint = %label, error = %e, "Background session close failed");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(session = %id, endpoint = %label, "Session dropped outside a runtime; backend discarded without close");
            }
        }
    }
}
