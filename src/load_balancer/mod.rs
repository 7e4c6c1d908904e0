//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Router filters endpoints by role → candidate slice
//!     → BalancingMode::select(cursor, candidates):
//!         - round_robin.rs (cursor rotates through candidates)
//!         - random.rs (uniform pick, cursor untouched)
//!     → Return one candidate
//! ```
//!
//! # Design Decisions
//! - Policy is stateless; the router owns one cursor per role
//! - Empty candidate slices are rejected by the router, never here
//! - Mode is fixed when the router is built

pub mod random;
pub mod round_robin;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;
pub use round_robin::Cursor;

/// Load balancing mode applied within a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "RawMode")]
pub enum BalancingMode {
    /// Rotate through candidates in registration order.
    #[default]
    RoundRobin,
    /// Pick a uniformly random candidate.
    Random,
}

impl BalancingMode {
    /// Map a legacy numeric mode code (`1` round robin, `2` random).
    pub fn from_code(code: u64) -> Result<Self, RouterError> {
        match code {
            1 => Ok(Self::RoundRobin),
            2 => Ok(Self::Random),
            other => Err(RouterError::InvalidBalancingMode(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::Random => "random",
        }
    }

    /// Select one candidate.
    ///
    /// Returns `None` only for an empty slice. Round robin advances `cursor`;
    /// random leaves it untouched.
    pub fn select<'a, T>(&self, cursor: &Cursor, candidates: &'a [T]) -> Option<&'a T> {
        if candidates.is_empty() {
            return None;
        }

        let index = match self {
            Self::RoundRobin => cursor.next_index(candidates.len()),
            Self::Random => random::random_index(candidates.len()),
        };
        candidates.get(index)
    }
}

impl fmt::Display for BalancingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BalancingMode {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "random" => Ok(Self::Random),
            other => match other.parse::<u64>() {
                Ok(code) => Self::from_code(code),
                Err(_) => Err(RouterError::InvalidBalancingMode(s.to_string())),
            },
        }
    }
}

/// Accepts either a mode name or a legacy numeric code from config files.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMode {
    Code(u64),
    Name(String),
}

impl TryFrom<RawMode> for BalancingMode {
    type Error = RouterError;

    fn try_from(raw: RawMode) -> Result<Self, Self::Error> {
        match raw {
            RawMode::Code(code) => Self::from_code(code),
            RawMode::Name(name) => name.parse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("round_robin".parse::<BalancingMode>().unwrap(), BalancingMode::RoundRobin);
        assert_eq!("Round-Robin".parse::<BalancingMode>().unwrap(), BalancingMode::RoundRobin);
        assert_eq!("RANDOM".parse::<BalancingMode>().unwrap(), BalancingMode::Random);
        assert_eq!("2".parse::<BalancingMode>().unwrap(), BalancingMode::Random);
    }

    #[test]
    fn test_invalid_mode_fails_loudly() {
        let err = "weighted".parse::<BalancingMode>().unwrap_err();
        assert!(matches!(err, RouterError::InvalidBalancingMode(ref m) if m == "weighted"));

        let err = BalancingMode::from_code(4).unwrap_err();
        assert!(matches!(err, RouterError::InvalidBalancingMode(ref m) if m == "4"));
    }

    #[test]
    fn test_deserialize_name_and_code() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: BalancingMode,
        }

        let w: Wrapper = toml::from_str("mode = \"random\"").unwrap();
        assert_eq!(w.mode, BalancingMode::Random);

        let w: Wrapper = toml::from_str("mode = 1").unwrap();
        assert_eq!(w.mode, BalancingMode::RoundRobin);

        assert!(toml::from_str::<Wrapper>("mode = \"least_conn\"").is_err());
    }

    #[test]
    fn test_serialize_as_name() {
        let json = serde_json::to_string(&BalancingMode::RoundRobin).unwrap();
        assert_eq!(json, "\"round_robin\"");
    }

    #[test]
    fn test_select_empty() {
        let cursor = Cursor::new();
        let empty: [u8; 0] = [];
        assert!(BalancingMode::RoundRobin.select(&cursor, &empty).is_none());
        assert!(BalancingMode::Random.select(&cursor, &empty).is_none());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_random_leaves_cursor() {
        let cursor = Cursor::new();
        let items = [1, 2, 3];
        for _ in 0..20 {
            let picked = BalancingMode::Random.select(&cursor, &items).unwrap();
            assert!(items.contains(picked));
        }
        assert_eq!(cursor.position(), 0);
    }
}
