//! Combining a turn's decisions into one world-state change.
//!
//! Deltas are summed, not averaged: two participants pushing the same
//! metric in the same direction move it twice as far.

use std::collections::HashSet;

use epoch_core::model::{Decision, EventDescriptor};
use epoch_core::world::StateDelta;

/// A decision whose option does not exist in the turn's event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice {
    /// The participant who made the decision.
    pub user_id: String,
    /// The option identifier that matched nothing.
    pub option_id: String,
}

/// The summed effect of one turn's decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnTally {
    /// Per-metric sum over every recognised choice.
    pub applied_change: StateDelta,
    /// Choices that contributed nothing because their option is unknown.
    pub unknown_choices: Vec<UnknownChoice>,
}

/// Sums the option deltas of `decisions` against `event`. Decisions naming
/// an option the event does not offer are skipped and reported.
#[must_use]
pub fn tally_turn(event: &EventDescriptor, decisions: &[Decision]) -> TurnTally {
    let mut tally = TurnTally::default();
    for decision in decisions {
        match event.option(&decision.chosen_option_id) {
            Some(option) => tally.applied_change.accumulate(&option.world_state_change),
            None => tally.unknown_choices.push(UnknownChoice {
                user_id: decision.user_id.clone(),
                option_id: decision.chosen_option_id.clone(),
            }),
        }
    }
    tally
}

/// Participants from `roster` with no decision among `decisions`, in roster
/// order.
#[must_use]
pub fn pending_participants(roster: &[String], decisions: &[Decision]) -> Vec<String> {
    let decided: HashSet<&str> = decisions.iter().map(|d| d.user_id.as_str()).collect();
    roster
        .iter()
        .filter(|id| !decided.contains(id.as_str()))
        .cloned()
        .collect()
}
