//! Collaborator interfaces.
//!
//! # Data Flow
//! ```text
//! ConnectionTarget (config)
//!     → ConnectionProvider::connect → Arc<dyn Connection> (one per endpoint)
//!     → Connection::open_session → Box<dyn SessionBackend> (one per unit of work)
//!     → Connection::release (teardown only)
//!
//! Schema provisioning:
//!     Session on a primary → SchemaCatalog::drop_all / create_all
//! ```
//!
//! # Design Decisions
//! - The router never pools connections itself; pooling belongs to the provider
//! - Errors from collaborators are returned unchanged, no retries here
//! - `release` must tolerate being called on an already released handle

pub mod catalog;
pub mod memory;
pub mod tcp;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ConnectionTarget;
use crate::error::RouterResult;
use crate::session::Session;

pub use catalog::StatementCatalog;
pub use memory::MemoryProvider;
pub use tcp::TcpProvider;

/// Builds connection handles from configured targets.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connect(&self, target: &ConnectionTarget) -> RouterResult<Arc<dyn Connection>>;
}

/// A live, independently poolable connection handle.
#[async_trait]
pub trait Connection: Send + Sync + fmt::Debug {
    /// Human-readable form used in diagnostics.
    fn describe(&self) -> String;

    /// Begin a new session on this connection.
    async fn open_session(&self) -> RouterResult<Box<dyn SessionBackend>>;

    /// Release the handle. Further sessions are rejected.
    async fn release(&self) -> RouterResult<()>;

    fn is_released(&self) -> bool;
}

/// Provider-side state of one session.
#[async_trait]
pub trait SessionBackend: Send {
    async fn begin(&mut self) -> RouterResult<()>;

    async fn commit(&mut self) -> RouterResult<()>;

    async fn rollback(&mut self) -> RouterResult<()>;

    /// Execute a statement, returning the affected row count as reported by the backend.
    async fn execute(&mut self, statement: &str) -> RouterResult<u64>;

    async fn close(&mut self) -> RouterResult<()>;
}

/// Known schema objects, provisioned on primaries only.
#[async_trait]
pub trait SchemaCatalog: Send + Sync {
    /// Drop every known schema object.
    async fn drop_all(&self, session: &mut Session) -> RouterResult<()>;

    /// Create every known schema object.
    async fn create_all(&self, session: &mut Session) -> RouterResult<()>;
}
