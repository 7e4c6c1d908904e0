//! Shared helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use replica_router::config::{ConnectionTarget, DatabaseConfig};
use replica_router::provider::memory::{Event, MemoryProvider};
use replica_router::provider::StatementCatalog;
use replica_router::{BalancingMode, Manager};

/// Topology with one primary and the given replica hosts.
pub fn database(primary: &str, replicas: &[&str], mode: BalancingMode) -> DatabaseConfig {
    DatabaseConfig {
        primary: ConnectionTarget::new(primary, "app").with_credentials("app", "secret"),
        replicas: replicas
            .iter()
            .map(|host| ConnectionTarget::new(*host, "app").with_credentials("app", "secret"))
            .collect(),
        balancing: mode,
        reset_schema: false,
    }
}

/// Catalog with one table.
pub fn users_catalog() -> StatementCatalog {
    StatementCatalog::new(
        vec!["CREATE TABLE users (id INT, user_id BIGINT, name VARCHAR(255))".into()],
        vec!["DROP TABLE IF EXISTS users".into()],
    )
}

/// Uninitialized manager over an in-memory provider.
pub fn manager(provider: &MemoryProvider) -> Manager {
    Manager::new(Arc::new(provider.clone()), Arc::new(users_catalog()))
}

/// Poll until `host` recorded `event` `expected` times, or panic.
#[allow(dead_code)]
pub async fn wait_for_count(provider: &MemoryProvider, host: &str, event: &Event, expected: usize) {
    for _ in 0..100 {
        if provider.count(host, event) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "{} saw {:?} {} times, expected {}",
        host,
        event,
        provider.count(host, event),
        expected
    );
}
