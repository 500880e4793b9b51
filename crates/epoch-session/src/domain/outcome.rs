//! Results reported to the caller of `submit_decision`.

use epoch_core::model::EventDescriptor;
use epoch_core::world::{StateDelta, WorldState};
use serde::Serialize;

/// What a decision submission did to its turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The decision was recorded; other participants have yet to decide.
    Waiting {
        /// The open turn.
        year: i64,
        /// Decisions recorded so far for the turn.
        decisions_received: usize,
        /// Roster size.
        required: usize,
        /// Participants without a decision, in roster order.
        pending: Vec<String>,
    },
    /// This submission closed the turn and opened the next one.
    Advanced {
        /// The newly opened turn.
        year_advanced_to: i64,
        /// Summed deltas of every decision in the closed turn.
        applied_change: StateDelta,
        /// World state the new turn starts with.
        new_world_state: WorldState,
        /// The new turn's event.
        next_event: EventDescriptor,
    },
    /// The submitted turn had already been closed, by this participant's
    /// earlier call or by someone else's.
    AlreadyAdvanced {
        /// The live turn.
        current_year: i64,
        /// The live turn's event, if it has been stored yet.
        event: Option<EventDescriptor>,
    },
}
