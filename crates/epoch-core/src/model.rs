//! Persisted documents: sessions, turn events, and participant decisions.
//!
//! Every document rejects unknown fields so that schema drift in the store
//! surfaces as an error rather than being silently dropped.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::require_identifier;
use crate::error::DomainError;
use crate::world::{StateDelta, WorldState};

/// Whether a session is played alone or with a roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// One participant, but the same turn rules apply.
    #[default]
    SinglePlayer,
    /// Several participants; a turn closes once all of them decide.
    Multiplayer,
}

impl SessionMode {
    /// Stable storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SinglePlayer => "single_player",
            Self::Multiplayer => "multiplayer",
        }
    }

    /// Parses the storage name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unknown name.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "single_player" => Ok(Self::SinglePlayer),
            "multiplayer" => Ok(Self::Multiplayer),
            other => Err(DomainError::Validation(format!(
                "unknown session mode: {other}"
            ))),
        }
    }
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepting new participants.
    Lobby,
    /// Roster closed; play in progress.
    Active,
}

impl SessionStatus {
    /// Stable storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::Active => "active",
        }
    }

    /// Parses the storage name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unknown name.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value {
            "lobby" => Ok(Self::Lobby),
            "active" => Ok(Self::Active),
            other => Err(DomainError::Validation(format!(
                "unknown session status: {other}"
            ))),
        }
    }
}

/// A simulation session and its shared world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    /// Session identifier.
    pub id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The live turn. Never decreases.
    pub current_year: i64,
    /// Play mode.
    pub mode: SessionMode,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Roster in join order, without duplicates.
    pub participant_ids: Vec<String>,
    /// Metric values after the last closed turn.
    pub world_state: WorldState,
}

impl Session {
    /// Returns `true` if `user_id` is on the roster.
    #[must_use]
    pub fn has_participant(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == user_id)
    }

    /// Adds `user_id` to the roster unless already present. Returns whether
    /// the roster changed.
    pub fn add_participant(&mut self, user_id: &str) -> bool {
        if self.has_participant(user_id) {
            return false;
        }
        self.participant_ids.push(user_id.to_owned());
        true
    }
}

/// A selectable choice within a turn event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventOption {
    /// Identifier, unique within its event.
    pub option_id: String,
    /// Text shown to participants.
    pub text: String,
    /// Effect on the world state when chosen.
    #[serde(default)]
    pub world_state_change: StateDelta,
}

/// The scenario presented for one turn of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDescriptor {
    /// The turn this event belongs to.
    pub year: i64,
    /// Narrative text.
    pub description: String,
    /// Choices, in display order.
    pub options: Vec<EventOption>,
}

impl EventDescriptor {
    /// Looks up an option by identifier.
    #[must_use]
    pub fn option(&self, option_id: &str) -> Option<&EventOption> {
        self.options.iter().find(|o| o.option_id == option_id)
    }

    /// Checks structural well-formedness: non-empty description, at least
    /// one option, and non-blank option identifiers without duplicates.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` describing the first problem found.
    pub fn validate(&self) -> Result<(), DomainError> {
        require_identifier("description", &self.description)?;
        if self.options.is_empty() {
            return Err(DomainError::Validation(
                "event must offer at least one option".to_owned(),
            ));
        }
        let mut seen = HashSet::with_capacity(self.options.len());
        for option in &self.options {
            require_identifier("option_id", &option.option_id)?;
            if !seen.insert(option.option_id.as_str()) {
                return Err(DomainError::Validation(format!(
                    "duplicate option_id: {}",
                    option.option_id
                )));
            }
        }
        Ok(())
    }
}

/// A participant's choice for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Decision {
    /// The session the decision belongs to.
    pub session_id: Uuid,
    /// The deciding participant.
    pub user_id: String,
    /// The turn decided.
    pub year: i64,
    /// The chosen option's identifier.
    pub chosen_option_id: String,
    /// When the decision was recorded.
    pub decided_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, delta: i64) -> EventOption {
        EventOption {
            option_id: id.to_owned(),
            text: format!("Option {id}"),
            world_state_change: StateDelta::from_iter([("publicTrust", delta)]),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_event() {
        let event = EventDescriptor {
            year: 2075,
            description: "A referendum on sensor networks.".to_owned(),
            options: vec![option("A", 2), option("B", -2)],
        };
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_option_ids() {
        let event = EventDescriptor {
            year: 2075,
            description: "A referendum on sensor networks.".to_owned(),
            options: vec![option("A", 2), option("A", -2)],
        };
        match event.validate().unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "duplicate option_id: A"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_event_without_options() {
        let event = EventDescriptor {
            year: 2075,
            description: "Nothing to choose.".to_owned(),
            options: vec![],
        };
        assert!(matches!(event.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_add_participant_is_set_union() {
        let mut session = Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            current_year: 2075,
            mode: SessionMode::Multiplayer,
            status: SessionStatus::Lobby,
            participant_ids: vec!["alice".to_owned()],
            world_state: WorldState::default(),
        };

        assert!(session.add_participant("bob"));
        assert!(!session.add_participant("alice"));
        assert_eq!(session.participant_ids, vec!["alice", "bob"]);
    }

    #[test]
    fn test_event_descriptor_rejects_unknown_fields() {
        let json = serde_json::json!({
            "year": 2075,
            "description": "x",
            "options": [],
            "mood": "grim"
        });
        assert!(serde_json::from_value::<EventDescriptor>(json).is_err());
    }

    #[test]
    fn test_event_option_requires_option_id() {
        let json = serde_json::json!({ "text": "Option A" });
        assert!(serde_json::from_value::<EventOption>(json).is_err());
    }

    #[test]
    fn test_status_round_trips_through_storage_name() {
        for status in [SessionStatus::Lobby, SessionStatus::Active] {
            assert_eq!(SessionStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(SessionStatus::parse("completed").is_err());
    }
}
