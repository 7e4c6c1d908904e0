//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Unit of work (read or write intent)
//!     → router.rs (filter endpoints by role)
//!     → load_balancer (pick one candidate with the role's cursor)
//!     → endpoint.rs (connection handle of the chosen endpoint)
//!     → Session opened on that connection
//! ```
//!
//! # Design Decisions
//! - Endpoints registered once, immutable once the router is shared
//! - Writes only ever reach the primary, reads only ever reach replicas
//! - Explicit NoEligibleEndpoint rather than a silent fallback to the other role
//! - Selection is pure and never awaits; only session opening does I/O

pub mod endpoint;
pub mod role;
pub mod router;

pub use endpoint::Endpoint;
pub use role::Role;
pub use router::Router;
