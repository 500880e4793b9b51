//! Test repositories: `SessionRepository` fakes for error and race paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use epoch_core::error::DomainError;
use epoch_core::model::{Decision, EventDescriptor, Session, SessionStatus};
use epoch_core::repository::SessionRepository;
use epoch_core::world::WorldState;
use epoch_store::memory::InMemorySessionRepository;
use uuid::Uuid;

fn unavailable() -> DomainError {
    DomainError::StoreUnavailable("connection refused".into())
}

/// A repository that fails every call with `StoreUnavailable`. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingSessionRepository;

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn ping(&self) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn get_session(&self, _session_id: Uuid) -> Result<Option<Session>, DomainError> {
        Err(unavailable())
    }

    async fn insert_session(&self, _session: &Session) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn add_participant(
        &self,
        _session_id: Uuid,
        _user_id: &str,
        _required_status: SessionStatus,
    ) -> Result<Session, DomainError> {
        Err(unavailable())
    }

    async fn transition_status(
        &self,
        _session_id: Uuid,
        _from: SessionStatus,
        _to: SessionStatus,
    ) -> Result<Session, DomainError> {
        Err(unavailable())
    }

    async fn advance_session(
        &self,
        _session_id: Uuid,
        _expected_year: i64,
        _world_state: &WorldState,
    ) -> Result<Session, DomainError> {
        Err(unavailable())
    }

    async fn get_event(
        &self,
        _session_id: Uuid,
        _year: i64,
    ) -> Result<Option<EventDescriptor>, DomainError> {
        Err(unavailable())
    }

    async fn insert_event(
        &self,
        _session_id: Uuid,
        _event: &EventDescriptor,
    ) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn upsert_decision(&self, _decision: &Decision) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn insert_decision(&self, _decision: &Decision) -> Result<(), DomainError> {
        Err(unavailable())
    }

    async fn decisions_for_year(
        &self,
        _session_id: Uuid,
        _year: i64,
    ) -> Result<Vec<Decision>, DomainError> {
        Err(unavailable())
    }
}

/// An in-memory repository where a simulated competitor wins the first
/// advancement race: the first `advance_session` call is preceded by a
/// competing advancement (world state unchanged) and the competitor's
/// event for the new year, so the caller's own conditional update fails.
#[derive(Debug)]
pub struct PreemptingRepository {
    inner: InMemorySessionRepository,
    competitor_event: EventDescriptor,
    preempted: AtomicBool,
}

impl PreemptingRepository {
    /// Creates a repository whose competitor stores `competitor_event` when
    /// it wins. The event's `year` is rewritten to the year it advances to.
    #[must_use]
    pub fn new(competitor_event: EventDescriptor) -> Self {
        Self {
            inner: InMemorySessionRepository::new(),
            competitor_event,
            preempted: AtomicBool::new(false),
        }
    }

    /// Returns `true` once the competitor has advanced.
    pub fn preempted(&self) -> bool {
        self.preempted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRepository for PreemptingRepository {
    async fn ping(&self) -> Result<(), DomainError> {
        self.inner.ping().await
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        self.inner.get_session(session_id).await
    }

    async fn insert_session(&self, session: &Session) -> Result<(), DomainError> {
        self.inner.insert_session(session).await
    }

    async fn add_participant(
        &self,
        session_id: Uuid,
        user_id: &str,
        required_status: SessionStatus,
    ) -> Result<Session, DomainError> {
        self.inner
            .add_participant(session_id, user_id, required_status)
            .await
    }

    async fn transition_status(
        &self,
        session_id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, DomainError> {
        self.inner.transition_status(session_id, from, to).await
    }

    async fn advance_session(
        &self,
        session_id: Uuid,
        expected_year: i64,
        world_state: &WorldState,
    ) -> Result<Session, DomainError> {
        if !self.preempted.swap(true, Ordering::SeqCst) {
            if let Some(current) = self.inner.get_session(session_id).await? {
                let won = self
                    .inner
                    .advance_session(session_id, expected_year, &current.world_state)
                    .await?;
                let mut event = self.competitor_event.clone();
                event.year = won.current_year;
                self.inner.insert_event(session_id, &event).await?;
            }
        }
        self.inner
            .advance_session(session_id, expected_year, world_state)
            .await
    }

    async fn get_event(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Option<EventDescriptor>, DomainError> {
        self.inner.get_event(session_id, year).await
    }

    async fn insert_event(
        &self,
        session_id: Uuid,
        event: &EventDescriptor,
    ) -> Result<(), DomainError> {
        self.inner.insert_event(session_id, event).await
    }

    async fn upsert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        self.inner.upsert_decision(decision).await
    }

    async fn insert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        self.inner.insert_decision(decision).await
    }

    async fn decisions_for_year(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Vec<Decision>, DomainError> {
        self.inner.decisions_for_year(session_id, year).await
    }
}
