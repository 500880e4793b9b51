//! Turn advancement.
//!
//! Every decision submission records the decision and then checks whether
//! the turn can close. The closing write is a conditional update on the
//! session's year, so among concurrent submitters exactly one advances the
//! turn and generates the next event; the rest observe `AlreadyAdvanced`.

use epoch_core::clock::Clock;
use epoch_core::command::Command;
use epoch_core::error::DomainError;
use epoch_core::generator::EventGenerator;
use epoch_core::model::{Decision, EventDescriptor, SessionStatus};
use epoch_core::repository::SessionRepository;
use epoch_core::world::WorldState;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::ledger::write_decision;
use crate::domain::aggregation::{pending_participants, tally_turn};
use crate::domain::commands::SubmitDecision;
use crate::domain::outcome::TurnOutcome;
use crate::domain::settings::DecisionPolicy;

async fn already_advanced(
    repo: &dyn SessionRepository,
    session_id: Uuid,
    current_year: i64,
) -> Result<TurnOutcome, DomainError> {
    let event = repo.get_event(session_id, current_year).await?;
    Ok(TurnOutcome::AlreadyAdvanced {
        current_year,
        event,
    })
}

async fn generate_next_event(
    generator: &dyn EventGenerator,
    world_state: &WorldState,
    year: i64,
) -> Result<EventDescriptor, DomainError> {
    let mut event = generator.generate(world_state, year).await?;
    event.year = year;
    event.validate().map_err(|e| match e {
        DomainError::Validation(msg) => {
            DomainError::GeneratorUnavailable(format!("generated event rejected: {msg}"))
        }
        other => other,
    })?;
    Ok(event)
}

/// Produces the event for the turn that was just opened. An event already
/// stored for that year, seeded ahead of time, is kept and the generator is
/// not consulted.
async fn open_next_turn(
    repo: &dyn SessionRepository,
    generator: &dyn EventGenerator,
    session_id: Uuid,
    world_state: &WorldState,
    year: i64,
) -> Result<EventDescriptor, DomainError> {
    if let Some(seeded) = repo.get_event(session_id, year).await? {
        info!(year, "keeping seeded event for the new turn");
        return Ok(seeded);
    }

    let generated = generate_next_event(generator, world_state, year).await?;
    match repo.insert_event(session_id, &generated).await {
        Ok(()) => Ok(generated),
        Err(DomainError::Conflict { reason, .. }) => {
            warn!(%reason, "event seeded while generating, keeping the stored one");
            repo.get_event(session_id, year)
                .await?
                .ok_or(DomainError::EventNotFound { session_id, year })
        }
        Err(e) => Err(e),
    }
}

/// Handles the `SubmitDecision` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for malformed input,
/// `DomainError::DuplicateDecision` under `DecisionPolicy::RejectDuplicate`
/// while the turn is still open, `DomainError::InvalidState` if the session
/// has not been started, `DomainError::SessionNotFound` /
/// `DomainError::EventNotFound` when the turn cannot be located, and store
/// or generator failures as they occur. A lost advancement race and a
/// submission for a closed turn are not errors.
#[instrument(
    skip_all,
    fields(
        session_id = %command.session_id,
        user_id = %command.user_id,
        year = command.year,
        correlation_id = %command.correlation_id,
    )
)]
pub async fn handle_submit_decision(
    command: &SubmitDecision,
    policy: DecisionPolicy,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
    generator: &dyn EventGenerator,
) -> Result<TurnOutcome, DomainError> {
    command.validate()?;
    let session_id = command.session_id;
    let year = command.year;

    let decision = Decision {
        session_id,
        user_id: command.user_id.clone(),
        year,
        chosen_option_id: command.option_id.clone(),
        decided_at: clock.now(),
    };
    if let Err(e) = write_decision(&decision, policy, repo).await {
        let DomainError::DuplicateDecision { .. } = e else {
            return Err(e);
        };
        let session = repo
            .get_session(session_id)
            .await?
            .ok_or(DomainError::SessionNotFound(session_id))?;
        if session.current_year == year {
            return Err(e);
        }
        debug!(current_year = session.current_year, "duplicate for a closed turn");
        return already_advanced(repo, session_id, session.current_year).await;
    }

    let session = repo
        .get_session(session_id)
        .await?
        .ok_or(DomainError::SessionNotFound(session_id))?;
    if session.current_year != year {
        debug!(current_year = session.current_year, "turn already closed");
        return already_advanced(repo, session_id, session.current_year).await;
    }
    if session.status != SessionStatus::Active {
        return Err(DomainError::InvalidState(format!(
            "session {session_id} is not active (status: {})",
            session.status.as_str()
        )));
    }

    let event = repo
        .get_event(session_id, year)
        .await?
        .ok_or(DomainError::EventNotFound { session_id, year })?;

    let decisions = repo.decisions_for_year(session_id, year).await?;
    let pending = pending_participants(&session.participant_ids, &decisions);
    if !pending.is_empty() {
        debug!(
            received = decisions.len(),
            pending = pending.len(),
            "waiting for participants"
        );
        return Ok(TurnOutcome::Waiting {
            year,
            decisions_received: decisions.len(),
            required: session.participant_ids.len(),
            pending,
        });
    }

    let refreshed = repo
        .get_session(session_id)
        .await?
        .ok_or(DomainError::SessionNotFound(session_id))?;
    if refreshed.current_year != year {
        debug!(current_year = refreshed.current_year, "turn closed concurrently");
        return already_advanced(repo, session_id, refreshed.current_year).await;
    }

    let tally = tally_turn(&event, &decisions);
    for unknown in &tally.unknown_choices {
        warn!(
            participant = %unknown.user_id,
            option_id = %unknown.option_id,
            "decision names an option the event does not offer"
        );
    }
    let new_world_state = refreshed.world_state.applied(&tally.applied_change);

    let advanced = match repo
        .advance_session(session_id, year, &new_world_state)
        .await
    {
        Ok(advanced) => advanced,
        Err(DomainError::Conflict { reason, .. }) => {
            warn!(%reason, "lost advancement race");
            let current = repo
                .get_session(session_id)
                .await?
                .ok_or(DomainError::SessionNotFound(session_id))?;
            return already_advanced(repo, session_id, current.current_year).await;
        }
        Err(e) => return Err(e),
    };

    let next_event = open_next_turn(
        repo,
        generator,
        session_id,
        &advanced.world_state,
        advanced.current_year,
    )
    .await?;

    info!(
        year_advanced_to = advanced.current_year,
        decisions = decisions.len(),
        "turn advanced"
    );
    Ok(TurnOutcome::Advanced {
        year_advanced_to: advanced.current_year,
        applied_change: tally.applied_change,
        new_world_state: advanced.world_state,
        next_event,
    })
}
