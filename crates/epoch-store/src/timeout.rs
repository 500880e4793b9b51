//! Bounded store calls.
//!
//! Wraps another repository and fails any call that does not finish within
//! the configured duration with `DomainError::StoreUnavailable`. Retrying is
//! left to the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use epoch_core::error::DomainError;
use epoch_core::model::{Decision, EventDescriptor, Session, SessionStatus};
use epoch_core::repository::SessionRepository;
use epoch_core::world::WorldState;

/// Repository decorator that applies a timeout to every call.
#[derive(Clone)]
pub struct TimeoutSessionRepository {
    inner: Arc<dyn SessionRepository>,
    timeout: Duration,
}

impl std::fmt::Debug for TimeoutSessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeoutSessionRepository")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl TimeoutSessionRepository {
    /// Wraps `inner` so each call is bounded by `timeout`.
    #[must_use]
    pub fn new(inner: Arc<dyn SessionRepository>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, DomainError>> + Send,
    ) -> Result<T, DomainError> {
        if let Ok(result) = tokio::time::timeout(self.timeout, call).await {
            result
        } else {
            let timeout_ms = self.timeout.as_millis();
            warn!(operation, timeout_ms, "store call timed out");
            Err(DomainError::StoreUnavailable(format!(
                "{operation} timed out after {timeout_ms} ms"
            )))
        }
    }
}

#[async_trait]
impl SessionRepository for TimeoutSessionRepository {
    async fn ping(&self) -> Result<(), DomainError> {
        self.bounded("ping", self.inner.ping()).await
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        self.bounded("get_session", self.inner.get_session(session_id))
            .await
    }

    async fn insert_session(&self, session: &Session) -> Result<(), DomainError> {
        self.bounded("insert_session", self.inner.insert_session(session))
            .await
    }

    async fn add_participant(
        &self,
        session_id: Uuid,
        user_id: &str,
        required_status: SessionStatus,
    ) -> Result<Session, DomainError> {
        self.bounded(
            "add_participant",
            self.inner
                .add_participant(session_id, user_id, required_status),
        )
        .await
    }

    async fn transition_status(
        &self,
        session_id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, DomainError> {
        self.bounded(
            "transition_status",
            self.inner.transition_status(session_id, from, to),
        )
        .await
    }

    async fn advance_session(
        &self,
        session_id: Uuid,
        expected_year: i64,
        world_state: &WorldState,
    ) -> Result<Session, DomainError> {
        self.bounded(
            "advance_session",
            self.inner
                .advance_session(session_id, expected_year, world_state),
        )
        .await
    }

    async fn get_event(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Option<EventDescriptor>, DomainError> {
        self.bounded("get_event", self.inner.get_event(session_id, year))
            .await
    }

    async fn insert_event(
        &self,
        session_id: Uuid,
        event: &EventDescriptor,
    ) -> Result<(), DomainError> {
        self.bounded("insert_event", self.inner.insert_event(session_id, event))
            .await
    }

    async fn upsert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        self.bounded("upsert_decision", self.inner.upsert_decision(decision))
            .await
    }

    async fn insert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        self.bounded("insert_decision", self.inner.insert_decision(decision))
            .await
    }

    async fn decisions_for_year(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Vec<Decision>, DomainError> {
        self.bounded(
            "decisions_for_year",
            self.inner.decisions_for_year(session_id, year),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySessionRepository;

    /// Never answers `get_session`; delegates nothing else.
    struct StalledRepository;

    #[async_trait]
    impl SessionRepository for StalledRepository {
        async fn ping(&self) -> Result<(), DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }

        async fn get_session(&self, _session_id: Uuid) -> Result<Option<Session>, DomainError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn insert_session(&self, _session: &Session) -> Result<(), DomainError> {
            unimplemented!()
        }

        async fn add_participant(
            &self,
            _session_id: Uuid,
            _user_id: &str,
            _required_status: SessionStatus,
        ) -> Result<Session, DomainError> {
            unimplemented!()
        }

        async fn transition_status(
            &self,
            _session_id: Uuid,
            _from: SessionStatus,
            _to: SessionStatus,
        ) -> Result<Session, DomainError> {
            unimplemented!()
        }

        async fn advance_session(
            &self,
            _session_id: Uuid,
            _expected_year: i64,
            _world_state: &WorldState,
        ) -> Result<Session, DomainError> {
            unimplemented!()
        }

        async fn get_event(
            &self,
            _session_id: Uuid,
            _year: i64,
        ) -> Result<Option<EventDescriptor>, DomainError> {
            unimplemented!()
        }

        async fn insert_event(
            &self,
            _session_id: Uuid,
            _event: &EventDescriptor,
        ) -> Result<(), DomainError> {
            unimplemented!()
        }

        async fn upsert_decision(&self, _decision: &Decision) -> Result<(), DomainError> {
            unimplemented!()
        }

        async fn insert_decision(&self, _decision: &Decision) -> Result<(), DomainError> {
            unimplemented!()
        }

        async fn decisions_for_year(
            &self,
            _session_id: Uuid,
            _year: i64,
        ) -> Result<Vec<Decision>, DomainError> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn test_stalled_call_becomes_store_unavailable() {
        // Arrange
        let repo =
            TimeoutSessionRepository::new(Arc::new(StalledRepository), Duration::from_millis(20));

        // Act
        let result = repo.get_session(Uuid::new_v4()).await;

        // Assert
        match result.unwrap_err() {
            DomainError::StoreUnavailable(msg) => {
                assert_eq!(msg, "get_session timed out after 20 ms");
            }
            other => panic!("expected StoreUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stalled_ping_becomes_store_unavailable() {
        let repo =
            TimeoutSessionRepository::new(Arc::new(StalledRepository), Duration::from_millis(20));

        let result = repo.ping().await;

        assert!(matches!(
            result,
            Err(DomainError::StoreUnavailable(ref msg)) if msg == "ping timed out after 20 ms"
        ));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let repo = TimeoutSessionRepository::new(
            Arc::new(InMemorySessionRepository::new()),
            Duration::from_secs(5),
        );

        let result = repo.get_session(Uuid::new_v4()).await.unwrap();

        assert!(result.is_none());
    }
}
