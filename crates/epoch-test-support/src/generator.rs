//! Test event generators.

use std::sync::Mutex;

use async_trait::async_trait;
use epoch_core::error::DomainError;
use epoch_core::generator::EventGenerator;
use epoch_core::model::{EventDescriptor, EventOption};
use epoch_core::world::{StateDelta, WorldState};

/// An event for `year` with option `A` (`publicTrust +2`) and option `B`
/// (`publicTrust -2`).
#[must_use]
pub fn two_option_event(year: i64) -> EventDescriptor {
    EventDescriptor {
        year,
        description: format!("Test event for the year {year}."),
        options: vec![
            EventOption {
                option_id: "A".to_owned(),
                text: "Option A".to_owned(),
                world_state_change: StateDelta::from_iter([("publicTrust", 2)]),
            },
            EventOption {
                option_id: "B".to_owned(),
                text: "Option B".to_owned(),
                world_state_change: StateDelta::from_iter([("publicTrust", -2)]),
            },
        ],
    }
}

/// A generator that returns `two_option_event(year)` and records every
/// call's inputs.
#[derive(Debug, Default)]
pub struct RecordingEventGenerator {
    calls: Mutex<Vec<(WorldState, i64)>>,
}

impl RecordingEventGenerator {
    /// Creates a generator with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all `(world_state, year)` inputs received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<(WorldState, i64)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times `generate` ran.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl EventGenerator for RecordingEventGenerator {
    async fn generate(
        &self,
        world_state: &WorldState,
        year: i64,
    ) -> Result<EventDescriptor, DomainError> {
        self.calls.lock().unwrap().push((world_state.clone(), year));
        Ok(two_option_event(year))
    }
}

/// A generator that always fails.
#[derive(Debug)]
pub struct FailingEventGenerator;

#[async_trait]
impl EventGenerator for FailingEventGenerator {
    async fn generate(
        &self,
        _world_state: &WorldState,
        _year: i64,
    ) -> Result<EventDescriptor, DomainError> {
        Err(DomainError::GeneratorUnavailable("model endpoint timed out".into()))
    }
}
