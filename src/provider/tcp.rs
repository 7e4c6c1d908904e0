//! TCP connection provider.
//!
//! # Responsibilities
//! - Resolve each target once, when the endpoint is built
//! - Open one TCP stream per session, bounded by the connect timeout
//! - Write transaction control and statements as newline-terminated text
//!
//! # Design Decisions
//! - No pooling: every session owns its stream, closed with the session
//! - Release marks the handle unusable; open streams finish on their own

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::ConnectionTarget;
use crate::error::{RouterError, RouterResult};
use crate::provider::{Connection, ConnectionProvider, SessionBackend};

/// Provider opening plain TCP streams to configured targets.
#[derive(Debug, Clone)]
pub struct TcpProvider {
    connect_timeout: Duration,
}

impl TcpProvider {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for TcpProvider {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl ConnectionProvider for TcpProvider {
    async fn connect(&self, target: &ConnectionTarget) -> RouterResult<Arc<dyn Connection>> {
        let address = target.address();
        let resolved = tokio::net::lookup_host(&address)
            .await
            .map_err(|e| RouterError::connection(&address, e))?
            .next()
            .ok_or_else(|| {
                RouterError::connection(
                    &address,
                    io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses"),
                )
            })?;

        tracing::debug!(target = %address, resolved = %resolved, "Resolved endpoint address");
        Ok(Arc::new(TcpConnection {
            address,
            resolved,
            database: target.database.clone(),
            connect_timeout: self.connect_timeout,
            released: AtomicBool::new(false),
        }))
    }
}

/// Connection handle created by [`TcpProvider`].
#[derive(Debug)]
pub struct TcpConnection {
    address: String,
    resolved: SocketAddr,
    database: String,
    connect_timeout: Duration,
    released: AtomicBool,
}

#[async_trait]
impl Connection for TcpConnection {
    fn describe(&self) -> String {
        format!("tcp://{}/{}", self.resolved, self.database)
    }

    async fn open_session(&self) -> RouterResult<Box<dyn SessionBackend>> {
        if self.is_released() {
            return Err(RouterError::connection(
                &self.address,
                io::Error::new(io::ErrorKind::NotConnected, "connection released"),
            ));
        }

        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(self.resolved))
            .await
            .map_err(|_| {
                RouterError::connection(
                    &self.address,
                    io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
                )
            })?
            .map_err(|e| RouterError::connection(&self.address, e))?;
        stream
            .set_nodelay(true)
            .map_err(|e| RouterError::connection(&self.address, e))?;

        Ok(Box::new(TcpSession {
            address: self.address.clone(),
            stream: Some(stream),
        }))
    }

    async fn release(&self) -> RouterResult<()> {
        if !self.released.swap(true, Ordering::AcqRel) {
            tracing::debug!(target = %self.address, "Connection handle released");
        }
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

struct TcpSession {
    address: String,
    stream: Option<TcpStream>,
}

impl TcpSession {
    async fn send_line(&mut self, line: &str) -> RouterResult<u64> {
        let stream = self.stream.as_mut().ok_or(RouterError::SessionClosed)?;
        let mut frame = Vec::with_capacity(line.len() + 1);
        frame.extend_from_slice(line.as_bytes());
        frame.push(b'\n');

        stream
            .write_all(&frame)
            .await
            .map_err(|e| RouterError::connection(&self.address, e))?;
        stream
            .flush()
            .await
            .map_err(|e| RouterError::connection(&self.address, e))?;
        Ok(frame.len() as u64)
    }
}

#[async_trait]
impl SessionBackend for TcpSession {
    async fn begin(&mut self) -> RouterResult<()> {
        self.send_line("BEGIN").await.map(|_| ())
    }

    async fn commit(&mut self) -> RouterResult<()> {
        self.send_line("COMMIT").await.map(|_| ())
    }

    async fn rollback(&mut self) -> RouterResult<()> {
        self.send_line("ROLLBACK").await.map(|_| ())
    }

    async fn execute(&mut self, statement: &str) -> RouterResult<u64> {
        self.send_line(statement).await
    }

    async fn close(&mut self) -> RouterResult<()> {
        if let Some(mut stream) = self.stream.take() {
            stream
                .shutdown()
                .await
                .map_err(|e| RouterError::connection(&self.address, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_session_writes_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = String::new();
            socket.read_to_string(&mut received).await.unwrap();
            received
        });

        let provider = TcpProvider::new(Duration::from_secs(2));
        let target = ConnectionTarget::new("127.0.0.1", "app").with_port(port);
        let conn = provider.connect(&target).await.unwrap();
        assert_eq!(conn.describe(), format!("tcp://127.0.0.1:{}/app", port));

        let mut session = conn.open_session().await.unwrap();
        session.begin().await.unwrap();
        assert_eq!(session.execute("SELECT 1").await.unwrap(), 9);
        session.commit().await.unwrap();
        session.close().await.unwrap();

        assert_eq!(server.await.unwrap(), "BEGIN\nSELECT 1\nCOMMIT\n");
    }

    #[tokio::test]
    async fn test_released_connection_rejects_sessions() {
        let provider = TcpProvider::default();
        let target = ConnectionTarget::new("127.0.0.1", "app").with_port(1);
        let conn = provider.connect(&target).await.unwrap();

        conn.release().await.unwrap();
        conn.release().await.unwrap();

        let err = conn.open_session().await.err().unwrap();
        assert!(matches!(err, RouterError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_propagates() {
        // bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let provider = TcpProvider::new(Duration::from_secs(2));
        let target = ConnectionTarget::new("127.0.0.1", "app").with_port(port);
        let conn = provider.connect(&target).await.unwrap();

        let err = conn.open_session().await.err().unwrap();
        assert!(err.is_collaborator());
    }
}
