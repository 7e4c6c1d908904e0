//! Statement-list schema catalog.

use async_trait::async_trait;

use crate::config::SchemaConfig;
use crate::error::RouterResult;
use crate::provider::SchemaCatalog;
use crate::session::Session;

/// A catalog made of plain DDL statements, executed in order.
#[derive(Debug, Clone, Default)]
pub struct StatementCatalog {
    create: Vec<String>,
    drop: Vec<String>,
}

impl StatementCatalog {
    pub fn new(create: Vec<String>, drop: Vec<String>) -> Self {
        Self { create, drop }
    }

    pub fn from_config(config: &SchemaConfig) -> Self {
        Self::new(config.create.clone(), config.drop.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.drop.is_empty()
    }

    async fn run_all(session: &mut Session, statements: &[String]) -> RouterResult<()> {
        for statement in statements {
            session.execute(statement).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SchemaCatalog for StatementCatalog {
    async fn drop_all(&self, session: &mut Session) -> RouterResult<()> {
        tracing::debug!(statements = self.drop.len(), endpoint = %session.endpoint().label(), "Dropping schema");
        Self::run_all(session, &self.drop).await
    }

    async fn create_all(&self, session: &mut Session) -> RouterResult<()> {
        tracing::debug!(statements = self.create.len(), endpoint = %session.endpoint().label(), "Creating schema");
        Self::run_all(session, &self.create).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::config::ConnectionTarget;
    use crate::provider::memory::{Event, MemoryProvider};
    use crate::provider::ConnectionProvider;
    use crate::routing::{Endpoint, Role};

    #[tokio::test]
    async fn test_statements_run_in_order() {
        let provider = MemoryProvider::new();
        let target = ConnectionTarget::new("db1", "app");
        let conn = provider.connect(&target).await.unwrap();
        let endpoint = Arc::new(Endpoint::new(Role::Primary, "db1", conn));
        let mut session = Session::open(endpoint).await.unwrap();

        let catalog = StatementCatalog::new(
            vec!["CREATE TABLE users (id INT)".into(), "CREATE INDEX ix ON users (id)".into()],
            vec!["DROP TABLE users".into()],
        );
        catalog.drop_all(&mut session).await.unwrap();
        catalog.create_all(&mut session).await.unwrap();
        session.close().await.unwrap();

        let statements: Vec<_> = provider
            .events_for("db1")
            .into_iter()
            .filter_map(|e| match e {
                Event::Execute(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(
            statements,
            vec!["DROP TABLE users", "CREATE TABLE users (id INT)", "CREATE INDEX ix ON users (id)"]
        );
    }

    #[test]
    fn test_from_config() {
        let config = SchemaConfig {
            create: vec!["CREATE TABLE t (id INT)".into()],
            drop: vec![],
        };
        assert!(!StatementCatalog::from_config(&config).is_empty());
        assert!(StatementCatalog::default().is_empty());
    }
}
