//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same structure loads from TOML or JSON
//! and can be written back unchanged.

use serde::{Deserialize, Serialize};

use crate::load_balancer::BalancingMode;

/// Root configuration.
///
/// Only `database.primary` is required; every other section falls back to
/// its default.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct RouterConfig {
    /// Primary and replica targets plus balancing.
    pub database: DatabaseConfig,

    /// Schema statements provisioned on primaries.
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Timeout configuration.
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Database topology: one primary, any number of replicas.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DatabaseConfig {
    /// The writable primary.
    #[serde(alias = "master")]
    pub primary: ConnectionTarget,

    /// Read-only replicas, in routing order.
    #[serde(default, alias = "slaves")]
    pub replicas: Vec<ConnectionTarget>,

    /// Balancing mode within each role.
    #[serde(default)]
    pub balancing: BalancingMode,

    /// Drop schema objects before creating them at startup.
    #[serde(default, alias = "debug")]
    pub reset_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            primary: ConnectionTarget::new("127.0.0.1", "app"),
            replicas: Vec::new(),
            balancing: BalancingMode::RoundRobin,
            reset_schema: false,
        }
    }
}

/// A database server to connect to.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Hostname or IP address.
    pub host: String,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Login user.
    #[serde(default)]
    pub user: String,

    /// Login password.
    #[serde(default)]
    pub password: String,

    /// Database (schema) name.
    pub database: String,
}

fn default_port() -> u16 {
    3306
}

impl ConnectionTarget {
    /// Target on the default port with no credentials.
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            database: database.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection URL with the password masked, safe for logs.
    pub fn redacted_url(&self) -> String {
        if self.user.is_empty() {
            format!("mysql://{}/{}", self.address(), self.database)
        } else {
            format!("mysql://{}:***@{}/{}", self.user, self.address(), self.database)
        }
    }
}

/// Schema objects, as DDL statements.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Statements creating every known schema object, in order.
    pub create: Vec<String>,

    /// Statements dropping every known schema object, in order.
    pub drop: Vec<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { connect_secs: 5 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
