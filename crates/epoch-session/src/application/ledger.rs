//! Decision ledger and event catalog writes.

use epoch_core::clock::Clock;
use epoch_core::command::Command;
use epoch_core::error::DomainError;
use epoch_core::model::{Decision, EventDescriptor};
use epoch_core::repository::SessionRepository;
use tracing::{info, instrument};

use crate::domain::commands::{RecordDecision, SeedEvent};
use crate::domain::settings::DecisionPolicy;

/// Writes `decision` under `policy`: an upsert when overwriting, a
/// conditional insert when duplicates are rejected.
pub(crate) async fn write_decision(
    decision: &Decision,
    policy: DecisionPolicy,
    repo: &dyn SessionRepository,
) -> Result<(), DomainError> {
    match policy {
        DecisionPolicy::Overwrite => repo.upsert_decision(decision).await,
        DecisionPolicy::RejectDuplicate => repo.insert_decision(decision).await,
    }
}

/// Handles the `SeedEvent` command: stores an externally authored event for
/// a turn of an existing session.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the event is malformed,
/// `DomainError::SessionNotFound` if the session does not exist, and
/// `DomainError::InvalidState` if the year already has an event.
#[instrument(skip_all, fields(session_id = %command.session_id, year = command.event.year))]
pub async fn handle_seed_event(
    command: &SeedEvent,
    repo: &dyn SessionRepository,
) -> Result<EventDescriptor, DomainError> {
    command.validate()?;
    if repo.get_session(command.session_id).await?.is_none() {
        return Err(DomainError::SessionNotFound(command.session_id));
    }

    repo.insert_event(command.session_id, &command.event)
        .await
        .map_err(|e| match e {
            DomainError::Conflict { session_id, .. } => DomainError::InvalidState(format!(
                "event for year {} already exists in session {session_id}",
                command.event.year
            )),
            other => other,
        })?;

    info!(options = command.event.options.len(), "event seeded");
    Ok(command.event.clone())
}

/// Handles the `RecordDecision` command: writes the decision to the ledger
/// without checking whether the turn can close.
///
/// # Errors
///
/// Returns `DomainError::Validation` for malformed input,
/// `DomainError::SessionNotFound` if the session does not exist, and
/// `DomainError::DuplicateDecision` under `DecisionPolicy::RejectDuplicate`.
#[instrument(skip_all, fields(session_id = %command.session_id, user_id = %command.user_id, year = command.year))]
pub async fn handle_record_decision(
    command: &RecordDecision,
    policy: DecisionPolicy,
    clock: &dyn Clock,
    repo: &dyn SessionRepository,
) -> Result<Decision, DomainError> {
    command.validate()?;
    if repo.get_session(command.session_id).await?.is_none() {
        return Err(DomainError::SessionNotFound(command.session_id));
    }

    let decision = Decision {
        session_id: command.session_id,
        user_id: command.user_id.clone(),
        year: command.year,
        chosen_option_id: command.option_id.clone(),
        decided_at: clock.now(),
    };
    write_decision(&decision, policy, repo).await?;

    info!(option_id = %decision.chosen_option_id, "decision recorded");
    Ok(decision)
}
