//! `PostgreSQL` implementation of the `SessionRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use epoch_core::error::DomainError;
use epoch_core::model::{
    Decision, EventDescriptor, EventOption, Session, SessionMode, SessionStatus,
};
use epoch_core::repository::SessionRepository;
use epoch_core::world::WorldState;

const SESSION_COLUMNS: &str =
    "id, created_at, current_year, mode, status, participant_ids, world_state";

#[allow(clippy::needless_pass_by_value)]
fn store_error(err: sqlx::Error) -> DomainError {
    DomainError::StoreUnavailable(err.to_string())
}

fn session_from_row(row: &PgRow) -> Result<Session, DomainError> {
    let mode: String = row.try_get("mode").map_err(store_error)?;
    let status: String = row.try_get("status").map_err(store_error)?;
    let Json(participant_ids): Json<Vec<String>> =
        row.try_get("participant_ids").map_err(store_error)?;
    let Json(world_state): Json<WorldState> = row.try_get("world_state").map_err(store_error)?;
    Ok(Session {
        id: row.try_get("id").map_err(store_error)?,
        created_at: row.try_get("created_at").map_err(store_error)?,
        current_year: row.try_get("current_year").map_err(store_error)?,
        mode: SessionMode::parse(&mode)?,
        status: SessionStatus::parse(&status)?,
        participant_ids,
        world_state,
    })
}

fn decision_from_row(row: &PgRow) -> Result<Decision, DomainError> {
    let decided_at: DateTime<Utc> = row.try_get("decided_at").map_err(store_error)?;
    Ok(Decision {
        session_id: row.try_get("session_id").map_err(store_error)?,
        user_id: row.try_get("user_id").map_err(store_error)?,
        year: row.try_get("year").map_err(store_error)?,
        chosen_option_id: row.try_get("chosen_option_id").map_err(store_error)?,
        decided_at,
    })
}

/// PostgreSQL-backed session repository.
#[derive(Debug, Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Creates a new `PgSessionRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinguishes "no such session" from "guard did not hold" after a
    /// conditional update matched no rows.
    async fn guard_failure(
        &self,
        session_id: Uuid,
        describe: impl FnOnce(&Session) -> String + Send,
    ) -> DomainError {
        match self.get_session(session_id).await {
            Ok(Some(session)) => DomainError::Conflict {
                session_id,
                reason: describe(&session),
            },
            Ok(None) => DomainError::SessionNotFound(session_id),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn insert_session(&self, session: &Session) -> Result<(), DomainError> {
        let result = sqlx::query(
            "INSERT INTO sessions (id, created_at, current_year, mode, status, participant_ids, world_state) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(session.id)
        .bind(session.created_at)
        .bind(session.current_year)
        .bind(session.mode.as_str())
        .bind(session.status.as_str())
        .bind(Json(&session.participant_ids))
        .bind(Json(&session.world_state))
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Conflict {
                session_id: session.id,
                reason: "session already exists".to_owned(),
            });
        }
        Ok(())
    }

    async fn add_participant(
        &self,
        session_id: Uuid,
        user_id: &str,
        required_status: SessionStatus,
    ) -> Result<Session, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE sessions SET participant_ids = CASE \
                 WHEN participant_ids @> jsonb_build_array($2::text) THEN participant_ids \
                 ELSE participant_ids || jsonb_build_array($2::text) \
             END \
             WHERE id = $1 AND status = $3 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(user_id)
        .bind(required_status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match row {
            Some(row) => session_from_row(&row),
            None => Err(self
                .guard_failure(session_id, |s| {
                    format!(
                        "expected status {}, found {}",
                        required_status.as_str(),
                        s.status.as_str()
                    )
                })
                .await),
        }
    }

    async fn transition_status(
        &self,
        session_id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<Session, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE sessions SET status = $3 WHERE id = $1 AND status = $2 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match row {
            Some(row) => session_from_row(&row),
            None => Err(self
                .guard_failure(session_id, |s| {
                    format!(
                        "expected status {}, found {}",
                        from.as_str(),
                        s.status.as_str()
                    )
                })
                .await),
        }
    }

    async fn advance_session(
        &self,
        session_id: Uuid,
        expected_year: i64,
        world_state: &WorldState,
    ) -> Result<Session, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE sessions SET current_year = current_year + 1, world_state = $3 \
             WHERE id = $1 AND current_year = $2 \
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(session_id)
        .bind(expected_year)
        .bind(Json(world_state))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        match row {
            Some(row) => session_from_row(&row),
            None => Err(self
                .guard_failure(session_id, |s| {
                    format!(
                        "expected current year {expected_year}, found {}",
                        s.current_year
                    )
                })
                .await),
        }
    }

    async fn get_event(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Option<EventDescriptor>, DomainError> {
        let row = sqlx::query(
            "SELECT year, description, options FROM session_events \
             WHERE session_id = $1 AND year = $2",
        )
        .bind(session_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Json(options): Json<Vec<EventOption>> =
            row.try_get("options").map_err(store_error)?;
        Ok(Some(EventDescriptor {
            year: row.try_get("year").map_err(store_error)?,
            description: row.try_get("description").map_err(store_error)?,
            options,
        }))
    }

    async fn insert_event(
        &self,
        session_id: Uuid,
        event: &EventDescriptor,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "INSERT INTO session_events (session_id, year, description, options) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (session_id, year) DO NOTHING",
        )
        .bind(session_id)
        .bind(event.year)
        .bind(&event.description)
        .bind(Json(&event.options))
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Conflict {
                session_id,
                reason: format!("event for year {} already exists", event.year),
            });
        }
        Ok(())
    }

    async fn upsert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO session_decisions (session_id, user_id, year, chosen_option_id, decided_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (session_id, user_id, year) \
             DO UPDATE SET chosen_option_id = EXCLUDED.chosen_option_id, \
                           decided_at = EXCLUDED.decided_at",
        )
        .bind(decision.session_id)
        .bind(&decision.user_id)
        .bind(decision.year)
        .bind(&decision.chosen_option_id)
        .bind(decision.decided_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    async fn insert_decision(&self, decision: &Decision) -> Result<(), DomainError> {
        let result = sqlx::query(
            "INSERT INTO session_decisions (session_id, user_id, year, chosen_option_id, decided_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (session_id, user_id, year) DO NOTHING",
        )
        .bind(decision.session_id)
        .bind(&decision.user_id)
        .bind(decision.year)
        .bind(&decision.chosen_option_id)
        .bind(decision.decided_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::DuplicateDecision {
                session_id: decision.session_id,
                user_id: decision.user_id.clone(),
                year: decision.year,
            });
        }
        Ok(())
    }

    async fn decisions_for_year(
        &self,
        session_id: Uuid,
        year: i64,
    ) -> Result<Vec<Decision>, DomainError> {
        let rows = sqlx::query(
            "SELECT session_id, user_id, year, chosen_option_id, decided_at \
             FROM session_decisions \
             WHERE session_id = $1 AND year = $2 \
             ORDER BY decided_at, user_id",
        )
        .bind(session_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(decision_from_row).collect()
    }
}
