//! Session lifecycle and roster handlers.
//!
//! Sessions open in the lobby with their creator on the roster. Users join
//! while the lobby is open; starting the session closes it.

use epoch_core::clock::Clock;
use epoch_core::command::Command;
use epoch_core::error::DomainError;
use epoch_core::model::{Session, SessionStatus};
use epoch_core::repository::SessionRepository;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::commands::{CreateSession, JoinSession, StartSession};
use crate::domain::settings::SessionDefaults;

fn not_in_lobby(session_id: Uuid, status: SessionStatus) -> DomainError {
    DomainError::InvalidState(format!(
        "session {session_id} is not in lobby state (status: {})",
        status.as_str()
    ))
}

/// Handles the `CreateSession` command: builds a lobby session from
/// `defaults` with the creator as its only participant, and persists it.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the creator ID is blank, or the
/// store's error if the insert fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id))]
pub async fn handle_create_session(
    command: &CreateSession,
    defaults: &SessionDefaults,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    command.validate()?;

    let session = Session {
        id: Uuid::new_v4(),
        created_at: clock.now(),
        current_year: defaults.initial_year,
        mode: command.mode,
        status: SessionStatus::Lobby,
        participant_ids: vec![command.creator_id.clone()],
        world_state: defaults.world_state.clone(),
    };
    repo.insert_session(&session).await?;

    info!(session_id = %session.id, mode = session.mode.as_str(), "session created");
    Ok(session)
}

/// Handles the `JoinSession` command. Joining is idempotent: a user already
/// on the roster gets the session back unchanged.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the session does not exist and
/// `DomainError::InvalidState` if it has left the lobby, including when a
/// concurrent start wins against this join.
#[instrument(skip_all, fields(session_id = %command.session_id, user_id = %command.user_id))]
pub async fn handle_join_session(
    command: &JoinSession,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    command.validate()?;

    let session = repo
        .get_session(command.session_id)
        .await?
        .ok_or(DomainError::SessionNotFound(command.session_id))?;
    if session.status != SessionStatus::Lobby {
        return Err(not_in_lobby(session.id, session.status));
    }
    if session.has_participant(&command.user_id) {
        return Ok(session);
    }

    match repo
        .add_participant(command.session_id, &command.user_id, SessionStatus::Lobby)
        .await
    {
        Ok(updated) => {
            info!(
                participants = updated.participant_ids.len(),
                "participant joined"
            );
            Ok(updated)
        }
        Err(DomainError::Conflict { .. }) => Err(not_in_lobby(
            command.session_id,
            SessionStatus::Active,
        )),
        Err(e) => Err(e),
    }
}

/// Handles the `StartSession` command: moves the session from the lobby to
/// active play. The roster is fixed from then on.
///
/// # Errors
///
/// Returns `DomainError::SessionNotFound` if the session does not exist and
/// `DomainError::InvalidState` if it is not in the lobby.
#[instrument(skip_all, fields(session_id = %command.session_id))]
pub async fn handle_start_session(
    command: &StartSession,
    repo: &dyn SessionRepository,
) -> Result<Session, DomainError> {
    match repo
        .transition_status(
            command.session_id,
            SessionStatus::Lobby,
            SessionStatus::Active,
        )
        .await
    {
        Ok(session) => {
            info!(
                participants = session.participant_ids.len(),
                "session started"
            );
            Ok(session)
        }
        Err(DomainError::Conflict { .. }) => Err(not_in_lobby(
            command.session_id,
            SessionStatus::Active,
        )),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use epoch_core::error::DomainError;
    use epoch_core::model::{SessionMode, SessionStatus};
    use epoch_core::repository::SessionRepository;
    use epoch_store::memory::InMemorySessionRepository;
    use epoch_test_support::{FailingSessionRepository, FixedClock};
    use uuid::Uuid;

    use super::*;

    async fn create(repo: &InMemorySessionRepository, mode: SessionMode) -> Session {
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            creator_id: "alice".to_owned(),
            mode,
        };
        handle_create_session(
            &command,
            &SessionDefaults::default(),
            &FixedClock::standard(),
            repo,
        )
        .await
        .unwrap()
    }

    fn join(session_id: Uuid, user_id: &str) -> JoinSession {
        JoinSession {
            correlation_id: Uuid::new_v4(),
            session_id,
            user_id: user_id.to_owned(),
        }
    }

    fn start(session_id: Uuid) -> StartSession {
        StartSession {
            correlation_id: Uuid::new_v4(),
            session_id,
        }
    }

    #[tokio::test]
    async fn test_handle_create_session_persists_lobby_with_creator() {
        // Arrange
        let repo = InMemorySessionRepository::new();
        let clock = FixedClock::standard();

        // Act
        let session = create(&repo, SessionMode::Multiplayer).await;

        // Assert
        let stored = repo.get_session(session.id).await.unwrap().unwrap();
        assert_eq!(stored, session);
        assert_eq!(stored.status, SessionStatus::Lobby);
        assert_eq!(stored.participant_ids, vec!["alice"]);
        assert_eq!(stored.current_year, 2075);
        assert_eq!(stored.created_at, clock.0);
        assert_eq!(stored.world_state.get("publicTrust"), Some(50));
    }

    #[tokio::test]
    async fn test_handle_create_session_rejects_blank_creator() {
        let repo = InMemorySessionRepository::new();
        let command = CreateSession {
            correlation_id: Uuid::new_v4(),
            creator_id: String::new(),
            mode: SessionMode::SinglePlayer,
        };

        let result = handle_create_session(
            &command,
            &SessionDefaults::default(),
            &FixedClock::standard(),
            &repo,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_handle_join_session_adds_participant() {
        // Arrange
        let repo = InMemorySessionRepository::new();
        let session = create(&repo, SessionMode::Multiplayer).await;

        // Act
        let joined = handle_join_session(&join(session.id, "bob"), &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(joined.participant_ids, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_handle_join_session_rejoin_is_noop() {
        // Arrange
        let repo = InMemorySessionRepository::new();
        let session = create(&repo, SessionMode::Multiplayer).await;
        let first = handle_join_session(&join(session.id, "bob"), &repo)
            .await
            .unwrap();

        // Act
        let second = handle_join_session(&join(session.id, "bob"), &repo)
            .await
            .unwrap();

        // Assert
        assert_eq!(second.participant_ids, first.participant_ids);
    }

    #[tokio::test]
    async fn test_handle_join_session_fails_once_started() {
        // Arrange
        let repo = InMemorySessionRepository::new();
        let session = create(&repo, SessionMode::Multiplayer).await;
        handle_start_session(&start(session.id), &repo)
            .await
            .unwrap();

        // Act
        let result = handle_join_session(&join(session.id, "bob"), &repo).await;

        // Assert
        match result.unwrap_err() {
            DomainError::InvalidState(msg) => assert!(msg.contains("not in lobby state")),
            other => panic!("expected InvalidState, got {other:?}"),
        }
        let stored = repo.get_session(session.id).await.unwrap().unwrap();
        assert_eq!(stored.participant_ids, vec!["alice"]);
    }

    #[tokio::test]
    async fn test_handle_join_session_returns_not_found_for_unknown_session() {
        let repo = InMemorySessionRepository::new();
        let missing = Uuid::new_v4();

        let result = handle_join_session(&join(missing, "bob"), &repo).await;

        match result.unwrap_err() {
            DomainError::SessionNotFound(id) => assert_eq!(id, missing),
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_start_session_twice_is_invalid_state() {
        // Arrange
        let repo = InMemorySessionRepository::new();
        let session = create(&repo, SessionMode::Multiplayer).await;

        // Act
        let started = handle_start_session(&start(session.id), &repo)
            .await
            .unwrap();
        let again = handle_start_session(&start(session.id), &repo).await;

        // Assert
        assert_eq!(started.status, SessionStatus::Active);
        assert!(matches!(again, Err(DomainError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_handle_start_session_returns_not_found_for_unknown_session() {
        let repo = InMemorySessionRepository::new();

        let result = handle_start_session(&start(Uuid::new_v4()), &repo).await;

        assert!(matches!(result, Err(DomainError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_store_failure_propagates_from_join() {
        let result =
            handle_join_session(&join(Uuid::new_v4(), "bob"), &FailingSessionRepository).await;

        assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
    }
}
