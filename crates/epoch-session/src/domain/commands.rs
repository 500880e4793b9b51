//! Commands for the session context.

use epoch_core::command::{Command, require_identifier, require_year};
use epoch_core::error::DomainError;
use epoch_core::model::{EventDescriptor, SessionMode};
use uuid::Uuid;

/// Command to open a new session with its creator as the first participant.
#[derive(Debug, Clone)]
pub struct CreateSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user creating the session.
    pub creator_id: String,
    /// Play mode.
    pub mode: SessionMode,
}

impl Command for CreateSession {
    fn command_type(&self) -> &'static str {
        "session.create_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_identifier("creator_id", &self.creator_id)
    }
}

/// Command to add a user to a session's roster while it is in the lobby.
#[derive(Debug, Clone)]
pub struct JoinSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to join.
    pub session_id: Uuid,
    /// The joining user.
    pub user_id: String,
}

impl Command for JoinSession {
    fn command_type(&self) -> &'static str {
        "session.join_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_identifier("user_id", &self.user_id)
    }
}

/// Command to close the lobby and start play.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to start.
    pub session_id: Uuid,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "session.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to store an externally authored event, typically the opening
/// turn's.
#[derive(Debug, Clone)]
pub struct SeedEvent {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session the event belongs to.
    pub session_id: Uuid,
    /// The event; its `year` selects the turn.
    pub event: EventDescriptor,
}

impl Command for SeedEvent {
    fn command_type(&self) -> &'static str {
        "session.seed_event"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_year(self.event.year)?;
        self.event.validate()
    }
}

/// Command to write a decision to the ledger without attempting to close
/// the turn.
#[derive(Debug, Clone)]
pub struct RecordDecision {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session the decision belongs to.
    pub session_id: Uuid,
    /// The deciding participant.
    pub user_id: String,
    /// The turn being decided.
    pub year: i64,
    /// The chosen option.
    pub option_id: String,
}

impl Command for RecordDecision {
    fn command_type(&self) -> &'static str {
        "session.record_decision"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> Result<(), DomainError> {
        validate_choice(&self.user_id, self.year, &self.option_id)
    }
}

/// Command to submit a participant's decision and advance the turn if it
/// was the last one outstanding.
#[derive(Debug, Clone)]
pub struct SubmitDecision {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session the decision belongs to.
    pub session_id: Uuid,
    /// The deciding participant.
    pub user_id: String,
    /// The turn the participant believes is live.
    pub year: i64,
    /// The chosen option.
    pub option_id: String,
}

impl Command for SubmitDecision {
    fn command_type(&self) -> &'static str {
        "session.submit_decision"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn validate(&self) -> Result<(), DomainError> {
        validate_choice(&self.user_id, self.year, &self.option_id)
    }
}

fn validate_choice(user_id: &str, year: i64, option_id: &str) -> Result<(), DomainError> {
    require_identifier("user_id", user_id)?;
    require_year(year)?;
    require_identifier("option_id", option_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(user_id: &str, year: i64, option_id: &str) -> SubmitDecision {
        SubmitDecision {
            correlation_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            year,
            option_id: option_id.to_owned(),
        }
    }

    #[test]
    fn test_submit_decision_validation_names_the_bad_field() {
        let cases = [
            (submit("", 2075, "A"), "user_id must not be empty"),
            (submit("alice", 0, "A"), "year must be positive, got 0"),
            (submit("alice", 2075, " "), "option_id must not be empty"),
        ];

        for (command, expected) in cases {
            match command.validate().unwrap_err() {
                DomainError::Validation(msg) => assert_eq!(msg, expected),
                other => panic!("expected Validation, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_seed_event_validation_rejects_non_positive_year() {
        let command = SeedEvent {
            correlation_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            event: EventDescriptor {
                year: -1,
                description: "x".to_owned(),
                options: vec![],
            },
        };

        assert!(matches!(command.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_command_types_are_namespaced() {
        assert_eq!(
            submit("alice", 2075, "A").command_type(),
            "session.submit_decision"
        );
    }
}
