//! Read/write-splitting database session router.
//!
//! Writes are routed to the primary, reads to replicas, each role balanced
//! round robin or at random. The [`Manager`] builds the endpoints from
//! configuration and hands out sessions that close on every exit path.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod load_balancer;
pub mod manager;
pub mod observability;
pub mod provider;
pub mod routing;
pub mod session;

pub use config::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use load_balancer::BalancingMode;
pub use manager::{Manager, ManagerState};
pub use routing::{Endpoint, Role, Router};
pub use session::Session;
