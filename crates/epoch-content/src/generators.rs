//! `EventGenerator` implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use epoch_core::error::DomainError;
use epoch_core::generator::EventGenerator;
use epoch_core::model::{EventDescriptor, EventOption};
use epoch_core::rng::DeterministicRng;
use epoch_core::world::{StateDelta, WorldState};
use tracing::debug;

use crate::catalog::EventCatalog;

/// Produces the same two-option placeholder event every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEventGenerator;

#[async_trait]
impl EventGenerator for StaticEventGenerator {
    async fn generate(
        &self,
        _world_state: &WorldState,
        year: i64,
    ) -> Result<EventDescriptor, DomainError> {
        Ok(EventDescriptor {
            year,
            description: format!("This is a new test event for the year {year}."),
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
        })
    }
}

/// Picks an eligible template from an [`EventCatalog`] with an injected RNG.
pub struct CatalogEventGenerator {
    catalog: EventCatalog,
    rng: Mutex<Box<dyn DeterministicRng>>,
}

impl std::fmt::Debug for CatalogEventGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEventGenerator")
            .field("templates", &self.catalog.templates.len())
            .finish_non_exhaustive()
    }
}

impl CatalogEventGenerator {
    /// Creates a generator drawing from `catalog` with `rng`.
    #[must_use]
    pub fn new(catalog: EventCatalog, rng: Box<dyn DeterministicRng>) -> Self {
        Self {
            catalog,
            rng: Mutex::new(rng),
        }
    }

    fn pick(&self, candidates: usize) -> Result<usize, DomainError> {
        let max = u32::try_from(candidates.saturating_sub(1)).unwrap_or(u32::MAX);
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| DomainError::GeneratorUnavailable("rng lock poisoned".to_owned()))?;
        let drawn = rng.next_u32_range(0, max);
        Ok(usize::try_from(drawn).map_or(0, |i| i.min(candidates.saturating_sub(1))))
    }
}

#[async_trait]
impl EventGenerator for CatalogEventGenerator {
    async fn generate(
        &self,
        world_state: &WorldState,
        year: i64,
    ) -> Result<EventDescriptor, DomainError> {
        let eligible: Vec<_> = self.catalog.eligible(world_state).collect();
        if eligible.is_empty() {
            return Err(DomainError::GeneratorUnavailable(format!(
                "no catalog template is eligible for year {year}"
            )));
        }
        let template = eligible[self.pick(eligible.len())?];
        debug!(template = %template.id, eligible = eligible.len(), "template selected");
        Ok(template.render(year))
    }
}
