//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No session exists with the given identifier.
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// The session has no event recorded for the requested year.
    #[error("event for year {year} not found in session {session_id}")]
    EventNotFound {
        /// The session that was searched.
        session_id: Uuid,
        /// The year whose event is missing.
        year: i64,
    },

    /// The operation is not permitted in the session's current status.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A validation error in domain logic or at the input boundary.
    #[error("validation error: {0}")]
    Validation(String),

    /// A participant already has a decision recorded for this turn and the
    /// duplicate-rejecting policy is active.
    #[error("user {user_id} already decided year {year} in session {session_id}")]
    DuplicateDecision {
        /// The session the decision belongs to.
        session_id: Uuid,
        /// The participant who resubmitted.
        user_id: String,
        /// The turn that was already decided.
        year: i64,
    },

    /// A conditional write lost against a concurrent writer.
    #[error("conflict on session {session_id}: {reason}")]
    Conflict {
        /// The session whose guard failed.
        session_id: Uuid,
        /// What the guard expected and what it found.
        reason: String,
    },

    /// The persistent store failed or did not answer in time.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The event generator failed or produced an unusable event.
    #[error("event generator unavailable: {0}")]
    GeneratorUnavailable(String),
}
