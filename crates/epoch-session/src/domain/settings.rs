//! Tunables for session creation and decision handling.

use std::str::FromStr;

use epoch_core::error::DomainError;
use epoch_core::world::WorldState;

/// What happens when a participant submits a second decision for a turn
/// they already decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecisionPolicy {
    /// The later decision replaces the earlier one.
    #[default]
    Overwrite,
    /// The later decision is refused with `DomainError::DuplicateDecision`.
    RejectDuplicate,
}

impl FromStr for DecisionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "reject_duplicate" | "reject" => Ok(Self::RejectDuplicate),
            other => Err(DomainError::Validation(format!(
                "unknown decision policy: {other}"
            ))),
        }
    }
}

/// Starting turn and world state for newly created sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDefaults {
    /// The first turn of every session.
    pub initial_year: i64,
    /// Metric values every session starts with.
    pub world_state: WorldState,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            initial_year: 2075,
            world_state: WorldState::from_iter([
                ("publicTrust", 50),
                ("socialCohesion", 50),
                ("techRegulation", 30),
            ]),
        }
    }
}
