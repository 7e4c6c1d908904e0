//! Manager lifecycle states.

use std::fmt;

/// Lifecycle of a [`Manager`](super::Manager).
///
/// ```text
/// Uninitialized → Initializing → Ready → Disposed
///        ↑______________|  (connect failure)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}
