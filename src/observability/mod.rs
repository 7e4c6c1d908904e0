//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, sessions and manager produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (selection, session and topology counters)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (role, endpoint, session id) on every event
//! - Metrics are cheap no-ops until a recorder is installed
//! - Selection counting lives next to selection, not in I/O paths

pub mod logging;
pub mod metrics;
