//! Persistent store abstraction.
//!
//! The turn engine needs keyed reads, insert-only writes for events,
//! guarded (compare-and-swap) updates, and a scan of one turn's decisions.
//! Guarded updates report a lost race as `DomainError::Conflict`; callers
//! decide how to recover.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::model::{Decision, EventDescriptor, Session, SessionStatus};
use crate::world::WorldState;

/// Repository trait for sessions, their events, and their decisions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Round-trip to the backing store. Fails with `StoreUnavailable` if it
    /// cannot be reached.
    async fn ping(&self) -> Result<(), DomainError>;

    /// Load a session by identifier. `Ok(None)` if it does not exist.
    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Insert a new session document.
    async fn insert_session(&self, session: &Session) -> Result<(), DomainError>;

    /// Add `user_id` to the roster with set-union semantics, guarded on the
    /// session currently having `required_status`. Returns the updated
    /// session.
    ///
    /// Fails with `SessionNotFound` if absent and `Conflict` if the status
    /// guard does not hold.
    async fn add_participant(
        &self,
        session_id: Uuid,
        user_id: &str,
        required_status: SessionStatus,
    ) -> Result<Session, DomainError>;

    /// Move the session from `from` to `to`, guarded on the current status
    /// being `from`. Fails with `SessionNotFound` or `Conflict`.
    async fn transition_status(
        &self,
        session_id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, DomainError>;

    /// Atomically replace the world state and set the live year to
    /// `expected_year + 1`, guarded on the live year equalling
    /// `expected_year`. Fails with `SessionNotFound` or `Conflict`.
    async fn advance_session(
        &self,
        session_id: Uuid,
        expected_year: i64,
        world_state: &WorldState,
    ) -> Result<Session, DomainError>;

    /// Load the event for `(session_id, year)`. `Ok(None)` if absent.
    async fn get_event(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Option<EventDescriptor>, DomainError>;

    /// Write the event for `(session_id, event.year)`. Events are never
    /// replaced: fails with `Conflict` if one already exists for that year.
    async fn insert_event(
        &self,
        session_id: Uuid,
        event: &EventDescriptor,
    ) -> Result<(), DomainError>;

    /// Write a decision, replacing any previous decision for the same
    /// `(session_id, user_id, year)`.
    async fn upsert_decision(&self, decision: &Decision) -> Result<(), DomainError>;

    /// Write a decision only if none exists for its key. Fails with
    /// `DuplicateDecision` otherwise.
    async fn insert_decision(&self, decision: &Decision) -> Result<(), DomainError>;

    /// All decisions recorded for one turn of a session, oldest first.
    async fn decisions_for_year(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Vec<Decision>, DomainError>;
}
