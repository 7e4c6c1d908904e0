//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → reload loop exits → Manager::teardown → config saved
//! ```
//!
//! # Design Decisions
//! - Teardown runs after every background task observed the signal
//! - Shutdown is idempotent: repeated triggers are harmless

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
