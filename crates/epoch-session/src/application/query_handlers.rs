//! Read-only lookups for sessions, events, and decisions.
//!
//! Absence is reported as `None` or an empty list, not as an error.

use epoch_core::error::DomainError;
use epoch_core::model::{Decision, EventDescriptor, Session};
use epoch_core::repository::SessionRepository;
use uuid::Uuid;

/// Retrieves a session by its ID.
///
/// # Errors
///
/// Returns the store's error if the read fails.
pub async fn get_session_by_id(
    session_id: Uuid,
    repo: &dyn SessionRepository,
) -> Result<Option<Session>, DomainError> {
    repo.get_session(session_id).await
}

/// Retrieves the event of the session's live turn. `None` when the session
/// does not exist or its live turn has no event yet.
///
/// # Errors
///
/// Returns the store's error if a read fails.
pub async fn get_current_event(
    session_id: Uuid,
    repo: &dyn SessionRepository,
) -> Result<Option<EventDescriptor>, DomainError> {
    let Some(session) = repo.get_session(session_id).await? else {
        return Ok(None);
    };
    repo.get_event(session_id, session.current_year).await
}

/// Retrieves every decision recorded for a turn.
///
/// # Errors
///
/// Returns the store's error if the read fails.
pub async fn get_decisions_for_year(
    session_id: Uuid,
    year: i64,
    repo: &dyn SessionRepository,
) -> Result<Vec<Decision>, DomainError> {
    repo.decisions_for_year(session_id, year).await
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use epoch_core::error::DomainError;
    use epoch_core::model::{Decision, SessionMode, SessionStatus};
    use epoch_core::repository::SessionRepository;
    use epoch_core::world::WorldState;
    use epoch_store::memory::InMemorySessionRepository;
    use epoch_test_support::{FailingSessionRepository, two_option_event};
    use uuid::Uuid;

    use super::*;

    fn session(current_year: i64) -> Session {
        Session {
            id: Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            current_year,
            mode: SessionMode::SinglePlayer,
            status: SessionStatus::Active,
            participant_ids: vec!["alice".to_owned()],
            world_state: WorldState::from_iter([("publicTrust", 50)]),
        }
    }

    #[tokio::test]
    async fn test_get_session_by_id_returns_none_for_unknown_session() {
        let repo = InMemorySessionRepository::new();

        let result = get_session_by_id(Uuid::new_v4(), &repo).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_current_event_follows_live_year() {
        // Arrange
        let repo = InMemorySessionRepository::new();
        let session = session(2076);
        repo.insert_session(&session).await.unwrap();
        repo.insert_event(session.id, &two_option_event(2075))
            .await
            .unwrap();
        repo.insert_event(session.id, &two_option_event(2076))
            .await
            .unwrap();

        // Act
        let event = get_current_event(session.id, &repo).await.unwrap();

        // Assert
        assert_eq!(event.map(|e| e.year), Some(2076));
    }

    #[tokio::test]
    async fn test_get_current_event_is_none_before_event_is_stored() {
        let repo = InMemorySessionRepository::new();
        let session = session(2075);
        repo.insert_session(&session).await.unwrap();

        let event = get_current_event(session.id, &repo).await.unwrap();

        assert!(event.is_none());
    }

    #[tokio::test]
    async fn test_get_decisions_for_year_filters_by_turn() {
        // Arrange
        let repo = InMemorySessionRepository::new();
        let session_id = Uuid::new_v4();
        for (user_id, year) in [("alice", 2075), ("bob", 2075), ("alice", 2076)] {
            repo.upsert_decision(&Decision {
                session_id,
                user_id: user_id.to_owned(),
                year,
                chosen_option_id: "A".to_owned(),
                decided_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            })
            .await
            .unwrap();
        }

        // Act
        let decisions = get_decisions_for_year(session_id, 2075, &repo)
            .await
            .unwrap();

        // Assert
        let users: Vec<_> = decisions.iter().map(|d| d.user_id.as_str()).collect();
        assert_eq!(users, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_store_failure_propagates_from_reads() {
        let result = get_current_event(Uuid::new_v4(), &FailingSessionRepository).await;

        assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
    }
}
