//! Endpoint roles.

use std::fmt;

/// The role an endpoint plays in the deployment.
///
/// A deployment has exactly one logical primary and zero or more replicas of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Writable primary.
    Primary,
    /// Read-only replica of the primary.
    Replica,
}

impl Role {
    /// Role serving the given intent: writes go to the primary, reads to replicas.
    pub fn for_write(for_write: bool) -> Self {
        if for_write {
            Self::Primary
        } else {
            Self::Replica
        }
    }

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Replica => "Replica",
        }
    }

    /// Lowercase name used for metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Replica => "replica",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_for_intent() {
        assert_eq!(Role::for_write(true), Role::Primary);
        assert_eq!(Role::for_write(false), Role::Replica);
    }

    #[test]
    fn test_role_names() {
        assert_eq!(Role::Primary.to_string(), "Primary");
        assert_eq!(Role::Replica.label(), "replica");
    }
}
