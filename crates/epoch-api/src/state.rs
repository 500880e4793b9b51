//! Shared application state.

use std::sync::Arc;

use epoch_core::clock::Clock;
use epoch_core::generator::EventGenerator;
use epoch_core::repository::SessionRepository;
use epoch_session::domain::settings::{DecisionPolicy, SessionDefaults};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session, event, and decision store.
    pub repository: Arc<dyn SessionRepository>,
    /// Next-turn event source.
    pub generator: Arc<dyn EventGenerator>,
    /// Clock used for timestamps.
    pub clock: Arc<dyn Clock>,
    /// Handling of repeated decisions.
    pub decision_policy: DecisionPolicy,
    /// Starting point for new sessions.
    pub session_defaults: Arc<SessionDefaults>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        generator: Arc<dyn EventGenerator>,
        clock: Arc<dyn Clock>,
        decision_policy: DecisionPolicy,
        session_defaults: SessionDefaults,
    ) -> Self {
        Self {
            repository,
            generator,
            clock,
            decision_policy,
            session_defaults: Arc::new(session_defaults),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("decision_policy", &self.decision_policy)
            .field("session_defaults", &self.session_defaults)
            .finish_non_exhaustive()
    }
}
