//! Next-turn event generation contract.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::model::EventDescriptor;
use crate::world::WorldState;

/// Produces the event for a new turn from the world state that turn opens
/// with. Implementations may call out to slow external services; they are
/// invoked at most once per successful advancement.
#[async_trait]
pub trait EventGenerator: Send + Sync {
    /// Generate the event for `year`.
    ///
    /// Failures should be reported as `DomainError::GeneratorUnavailable`.
    async fn generate(
        &self,
        world_state: &WorldState,
        year: i64,
    ) -> Result<EventDescriptor, DomainError>;
}
