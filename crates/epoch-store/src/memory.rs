//! In-process implementation of the `SessionRepository` trait.
//!
//! All tables live behind one `RwLock`; every guarded update checks and
//! writes under the same write guard, which gives the same exactly-once
//! guarantee as the conditional `UPDATE` in the Postgres store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use epoch_core::error::DomainError;
use epoch_core::model::{Decision, EventDescriptor, Session, SessionStatus};
use epoch_core::repository::SessionRepository;
use epoch_core::world::WorldState;

#[derive(Debug, Default)]
struct Tables {
    sessions: HashMap<Uuid, Session>,
    events: HashMap<(Uuid, i64), EventDescriptor>,
    decisions: HashMap<(Uuid, i64, String), Decision>,
}

impl Tables {
    fn session_mut(&mut self, session_id: Uuid) -> Result<&mut Session, DomainError> {
        self.sessions
            .get_mut(&session_id)
            .ok_or(DomainError::SessionNotFound(session_id))
    }
}

fn status_conflict(session: &Session, required: SessionStatus) -> DomainError {
    DomainError::Conflict {
        session_id: session.id,
        reason: format!(
            "expected status {}, found {}",
            required.as_str(),
            session.status.as_str()
        ),
    }
}

/// Session store held entirely in memory. Suitable for single-process
/// deployments and tests.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    tables: RwLock<Tables>,
}

impl InMemorySessionRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn ping(&self) -> Result<(), DomainError> {
        drop(self.tables.read().await);
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        Ok(self.tables.read().await.sessions.get(&session_id).cloned())
    }

    async fn insert_session(&self, session: &Session) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if tables.sessions.contains_key(&session.id) {
            return Err(DomainError::Conflict {
                session_id: session.id,
                reason: "session already exists".to_owned(),
            });
        }
        tables.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn add_participant(
        &self,
        session_id: Uuid,
        user_id: &str,
        required_status: SessionStatus,
    ) -> Result<Session, DomainError> {
        let mut tables = self.tables.write().await;
        let session = tables.session_mut(session_id)?;
        if session.status != required_status {
            return Err(status_conflict(session, required_status));
        }
        session.add_participant(user_id);
        Ok(session.clone())
    }

    async fn transition_status(
        &self,
        session_id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, DomainError> {
        let mut tables = self.tables.write().await;
        let session = tables.session_mut(session_id)?;
        if session.status != from {
            return Err(status_conflict(session, from));
        }
        session.status = to;
        Ok(session.clone())
    }

    async fn advance_session(
        &self,
        session_id: Uuid,
        expected_year: i64,
        world_state: &WorldState,
    ) -> Result<Session, DomainError> {
        let mut tables = self.tables.write().await;
        let session = tables.session_mut(session_id)?;
        if session.current_year != expected_year {
            return Err(DomainError::Conflict {
                session_id,
                reason: format!(
                    "expected current year {expected_year}, found {}",
                    session.current_year
                ),
            });
        }
        session.current_year = expected_year + 1;
        session.world_state = world_state.clone();
        Ok(session.clone())
    }

    async fn get_event(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Option<EventDescriptor>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .events
            .get(&(session_id, year))
            .cloned())
    }

    async fn insert_event(
        &self,
        session_id: Uuid,
        event: &EventDescriptor,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let key = (session_id, event.year);
        if tables.events.contains_key(&key) {
            return Err(DomainError::Conflict {
                session_id,
                reason: format!("event for year {} already exists", event.year),
            });
        }
        tables.events.insert(key, event.clone());
        Ok(())
    }

    async fn upsert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        let key = (decision.session_id, decision.year, decision.user_id.clone());
        self.tables
            .write()
            .await
            .decisions
            .insert(key, decision.clone());
        Ok(())
    }

    async fn insert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        let key = (decision.session_id, decision.year, decision.user_id.clone());
        let mut tables = self.tables.write().await;
        if tables.decisions.contains_key(&key) {
            return Err(DomainError::DuplicateDecision {
                session_id: decision.session_id,
                user_id: decision.user_id.clone(),
                year: decision.year,
            });
        }
        tables.decisions.insert(key, decision.clone());
        Ok(())
    }

    async fn decisions_for_year(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Vec<Decision>, DomainError> {
        let tables = self.tables.read().await;
        let mut decisions: Vec<Decision> = tables
            .decisions
            .values()
            .filter(|d| d.session_id == session_id && d.year == year)
            .cloned()
            .collect();
        decisions.sort_by(|a, b| {
            a.decided_at
                .cmp(&b.decided_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(decisions)
    }
}
