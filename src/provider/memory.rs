//! In-memory connection provider.
//!
//! Keeps no data; every call is appended to a shared journal so callers can
//! assert which endpoint did what, and in which order. Failures can be
//! injected per host or per statement. Used by the test suite and by dry runs.

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::ConnectionTarget;
use crate::error::{RouterError, RouterResult};
use crate::provider::{Connection, ConnectionProvider, SessionBackend};

/// A recorded provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connected,
    SessionOpened,
    Begin,
    Execute(String),
    Commit,
    Rollback,
    SessionClosed,
    Released,
}

/// One journal line: which host saw which event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub host: String,
    pub event: Event,
}

#[derive(Debug, Default)]
struct Shared {
    journal: Mutex<Vec<JournalEntry>>,
    failing_hosts: Mutex<HashSet<String>>,
    failing_statements: Mutex<Vec<String>>,
}

impl Shared {
    fn record(&self, host: &str, event: Event) {
        self.journal.lock().push(JournalEntry {
            host: host.to_string(),
            event,
        });
    }

    fn host_fails(&self, host: &str) -> bool {
        self.failing_hosts.lock().contains(host)
    }

    fn statement_fails(&self, statement: &str) -> bool {
        self.failing_statements
            .lock()
            .iter()
            .any(|pattern| statement.contains(pattern.as_str()))
    }
}

/// Provider whose connections live entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    shared: Arc<Shared>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `connect` and `open_session` fail for the given host.
    pub fn fail_host(&self, host: impl Into<String>) {
        self.shared.failing_hosts.lock().insert(host.into());
    }

    /// Clear injected host failures.
    pub fn heal_host(&self, host: &str) {
        self.shared.failing_hosts.lock().remove(host);
    }

    /// Make `execute` fail for statements containing `pattern`.
    pub fn fail_statements_containing(&self, pattern: impl Into<String>) {
        self.shared.failing_statements.lock().push(pattern.into());
    }

    /// Snapshot of every recorded event.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.shared.journal.lock().clone()
    }

    /// Events recorded for one host, in order.
    pub fn events_for(&self, host: &str) -> Vec<Event> {
        self.shared
            .journal
            .lock()
            .iter()
            .filter(|entry| entry.host == host)
            .map(|entry| entry.event.clone())
            .collect()
    }

    /// Number of times `event` was recorded for `host`.
    pub fn count(&self, host: &str, event: &Event) -> usize {
        self.shared
            .journal
            .lock()
            .iter()
            .filter(|entry| entry.host == host && &entry.event == event)
            .count()
    }
}

#[async_trait]
impl ConnectionProvider for MemoryProvider {
    async fn connect(&self, target: &ConnectionTarget) -> RouterResult<Arc<dyn Connection>> {
        if self.shared.host_fails(&target.host) {
            return Err(RouterError::connection(
                target.address(),
                io::Error::new(io::ErrorKind::ConnectionRefused, "injected connect failure"),
            ));
        }

        self.shared.record(&target.host, Event::Connected);
        Ok(Arc::new(MemoryConnection {
            host: target.host.clone(),
            address: target.address(),
            description: format!("memory://{}/{}", target.address(), target.database),
            shared: self.shared.clone(),
            released: AtomicBool::new(false),
        }))
    }
}

/// Connection handle created by [`MemoryProvider`].
#[derive(Debug)]
pub struct MemoryConnection {
    host: String,
    address: String,
    description: String,
    shared: Arc<Shared>,
    released: AtomicBool,
}

#[async_trait]
impl Connection for MemoryConnection {
    fn describe(&self) -> String {
        self.description.clone()
    }

    async fn open_session(&self) -> RouterResult<Box<dyn SessionBackend>> {
        if self.is_released() {
            return Err(RouterError::connection(
                &self.address,
                io::Error::new(io::ErrorKind::NotConnected, "connection released"),
            ));
        }
        if self.shared.host_fails(&self.host) {
            return Err(RouterError::connection(
                &self.address,
                io::Error::new(io::ErrorKind::ConnectionReset, "injected session failure"),
            ));
        }

        self.shared.record(&self.host, Event::SessionOpened);
        Ok(Box::new(MemorySession {
            host: self.host.clone(),
            shared: self.shared.clone(),
        }))
    }

    async fn release(&self) -> RouterResult<()> {
        if !self.released.swap(true, Ordering::AcqRel) {
            self.shared.record(&self.host, Event::Released);
        }
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

struct MemorySession {
    host: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl SessionBackend for MemorySession {
    async fn begin(&mut self) -> RouterResult<()> {
        self.shared.record(&self.host, Event::Begin);
        Ok(())
    }

    async fn commit(&mut self) -> RouterResult<()> {
        self.shared.record(&self.host, Event::Commit);
        Ok(())
    }

    async fn rollback(&mut self) -> RouterResult<()> {
        self.shared.record(&self.host, Event::Rollback);
        Ok(())
    }

    async fn execute(&mut self, statement: &str) -> RouterResult<u64> {
        if self.shared.statement_fails(statement) {
            return Err(RouterError::session(format!("injected failure: {}", statement)));
        }
        self.shared.record(&self.host, Event::Execute(statement.to_string()));
        Ok(0)
    }

    async fn close(&mut self) -> RouterResult<()> {
        self.shared.record(&self.host, Event::SessionClosed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_journal_records_in_order() {
        let provider = MemoryProvider::new();
        let conn = provider.connect(&ConnectionTarget::new("db1", "app")).await.unwrap();

        let mut session = conn.open_session().await.unwrap();
        session.begin().await.unwrap();
        session.execute("SELECT 1").await.unwrap();
        session.commit().await.unwrap();
        session.close().await.unwrap();
        conn.release().await.unwrap();

        assert_eq!(
            provider.events_for("db1"),
            vec![
                Event::Connected,
                Event::SessionOpened,
                Event::Begin,
                Event::Execute("SELECT 1".into()),
                Event::Commit,
                Event::SessionClosed,
                Event::Released,
            ]
        );
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let provider = MemoryProvider::new();
        let conn = provider.connect(&ConnectionTarget::new("db1", "app")).await.unwrap();

        conn.release().await.unwrap();
        conn.release().await.unwrap();

        assert!(conn.is_released());
        assert_eq!(provider.count("db1", &Event::Released), 1);
        assert!(conn.open_session().await.is_err());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let provider = MemoryProvider::new();
        provider.fail_host("down");
        let err = provider.connect(&ConnectionTarget::new("down", "app")).await.unwrap_err();
        assert!(matches!(err, RouterError::Connection { .. }));

        provider.heal_host("down");
        assert!(provider.connect(&ConnectionTarget::new("down", "app")).await.is_ok());

        provider.fail_statements_containing("DROP");
        let conn = provider.connect(&ConnectionTarget::new("db1", "app")).await.unwrap();
        let mut session = conn.open_session().await.unwrap();
        assert!(session.execute("DROP TABLE users").await.is_err());
        assert!(session.execute("CREATE TABLE users (id INT)").await.is_ok());
    }
}
