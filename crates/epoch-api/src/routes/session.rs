//! Routes for sessions, their events, and turn decisions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use epoch_core::error::DomainError;
use epoch_core::model::{Decision, EventDescriptor, Session, SessionMode};
use epoch_session::application::{ledger, membership, query_handlers, turn_coordinator};
use epoch_session::domain::commands;
use epoch_session::domain::outcome::TurnOutcome;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    /// The user opening the session.
    pub creator_id: String,
    /// Single-player unless stated.
    #[serde(default)]
    pub mode: SessionMode,
}

/// Request body for POST /{session_id}/join.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinSessionRequest {
    /// The joining user.
    pub user_id: String,
}

/// Request body for POST /{session_id}/decisions and
/// POST /{session_id}/submit-turn.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionRequest {
    /// The deciding participant.
    pub user_id: String,
    /// The turn being decided.
    pub year: i64,
    /// The chosen option.
    pub option_id: String,
}

/// POST /
#[instrument(skip(state, request), fields(creator_id = %request.creator_id))]
async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let command = commands::CreateSession {
        correlation_id: Uuid::new_v4(),
        creator_id: request.creator_id,
        mode: request.mode,
    };

    info!(correlation_id = %command.correlation_id, "handling create_session command");

    let session = membership::handle_create_session(
        &command,
        &state.session_defaults,
        state.clock.as_ref(),
        &*state.repository,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /{session_id}
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    let session = query_handlers::get_session_by_id(session_id, &*state.repository)
        .await?
        .ok_or(DomainError::SessionNotFound(session_id))?;
    Ok(Json(session))
}

/// POST /{session_id}/join
#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn join_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<JoinSessionRequest>,
) -> Result<Json<Session>, ApiError> {
    let command = commands::JoinSession {
        correlation_id: Uuid::new_v4(),
        session_id,
        user_id: request.user_id,
    };

    info!(correlation_id = %command.correlation_id, "handling join_session command");

    let session = membership::handle_join_session(&command, &*state.repository).await?;
    Ok(Json(session))
}

/// POST /{session_id}/start
#[instrument(skip(state))]
async fn start_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    let command = commands::StartSession {
        correlation_id: Uuid::new_v4(),
        session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let session = membership::handle_start_session(&command, &*state.repository).await?;
    Ok(Json(session))
}

/// POST /{session_id}/events
#[instrument(skip(state, event), fields(year = event.year))]
async fn seed_event(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(event): Json<EventDescriptor>,
) -> Result<(StatusCode, Json<EventDescriptor>), ApiError> {
    let command = commands::SeedEvent {
        correlation_id: Uuid::new_v4(),
        session_id,
        event,
    };

    info!(correlation_id = %command.correlation_id, "handling seed_event command");

    let event = ledger::handle_seed_event(&command, &*state.repository).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /{session_id}/current-event
async fn get_current_event(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<EventDescriptor>, ApiError> {
    let session = query_handlers::get_session_by_id(session_id, &*state.repository)
        .await?
        .ok_or(DomainError::SessionNotFound(session_id))?;
    let event = query_handlers::get_current_event(session_id, &*state.repository)
        .await?
        .ok_or(DomainError::EventNotFound {
            session_id,
            year: session.current_year,
        })?;
    Ok(Json(event))
}

/// POST /{session_id}/decisions
#[instrument(skip(state, request), fields(user_id = %request.user_id, year = request.year))]
async fn record_decision(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<(StatusCode, Json<Decision>), ApiError> {
    let command = commands::RecordDecision {
        correlation_id: Uuid::new_v4(),
        session_id,
        user_id: request.user_id,
        year: request.year,
        option_id: request.option_id,
    };

    info!(correlation_id = %command.correlation_id, "handling record_decision command");

    let decision = ledger::handle_record_decision(
        &command,
        state.decision_policy,
        state.clock.as_ref(),
        &*state.repository,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(decision)))
}

/// GET /{session_id}/decisions/{year}
async fn get_decisions(
    State(state): State<AppState>,
    Path((session_id, year)): Path<(Uuid, i64)>,
) -> Result<Json<Vec<Decision>>, ApiError> {
    let decisions =
        query_handlers::get_decisions_for_year(session_id, year, &*state.repository).await?;
    Ok(Json(decisions))
}

/// POST /{session_id}/submit-turn
#[instrument(skip(state, request), fields(user_id = %request.user_id, year = request.year))]
async fn submit_turn(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<TurnOutcome>, ApiError> {
    let command = commands::SubmitDecision {
        correlation_id: Uuid::new_v4(),
        session_id,
        user_id: request.user_id,
        year: request.year,
        option_id: request.option_id,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_decision command");

    let outcome = turn_coordinator::handle_submit_decision(
        &command,
        state.decision_policy,
        state.clock.as_ref(),
        &*state.repository,
        &*state.generator,
    )
    .await?;
    Ok(Json(outcome))
}

/// Returns the router for the session context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/join", post(join_session))
        .route("/{session_id}/start", post(start_session))
        .route("/{session_id}/events", post(seed_event))
        .route("/{session_id}/current-event", get(get_current_event))
        .route("/{session_id}/decisions", post(record_decision))
        .route("/{session_id}/decisions/{year}", get(get_decisions))
        .route("/{session_id}/submit-turn", post(submit_turn))
}
