//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML or JSON)
//!     → loader.rs (parse & deserialize, format picked by extension)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → DatabaseConfig handed to the Manager
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → Manager::reconfigure swaps in a fresh Router
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Historical key names (`master`, `slaves`, `debug`) accepted as aliases

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::ConnectionTarget;
pub use schema::DatabaseConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouterConfig;
pub use schema::SchemaConfig;
pub use schema::TimeoutConfig;
