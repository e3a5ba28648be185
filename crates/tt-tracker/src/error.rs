//! Error types for tracker commands.

use std::fmt;

use tt_core::{CoreError, ValidationError};
use tt_mechanics::MechError;
use tt_store::StoreError;

/// Result type for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// The kinds of entity a command can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A game instance.
    Instance,
    /// A character.
    Character,
    /// An encounter.
    Encounter,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance => write!(f, "instance"),
            Self::Character => write!(f, "character"),
            Self::Encounter => write!(f, "encounter"),
        }
    }
}

/// Errors that can occur while running a tracker command.
///
/// Every variant except `Persistence` is raised before anything is
/// written, so the store and the cached snapshot are unchanged.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// A character invariant was violated.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced id does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was being looked up.
        kind: EntityKind,
        /// The id or prefix that failed to resolve.
        id: String,
    },

    /// An id prefix matched more than one entity.
    #[error("{kind} id prefix \"{prefix}\" is ambiguous ({matches} matches)")]
    Ambiguous {
        /// What was being looked up.
        kind: EntityKind,
        /// The prefix given.
        prefix: String,
        /// How many entities matched.
        matches: usize,
    },

    /// Two entities that must share an instance do not.
    #[error("cross-reference violation: {0}")]
    CrossReference(String),

    /// The turn engine refused the transition.
    #[error("{0}")]
    Turn(MechError),

    /// A type or status name could not be parsed.
    #[error("{0}")]
    Core(CoreError),

    /// Command input could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// The store failed; nothing was applied.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl TrackerError {
    pub(crate) fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl From<MechError> for TrackerError {
    fn from(err: MechError) -> Self {
        match err {
            MechError::CrossInstanceParticipant { .. } => Self::CrossReference(err.to_string()),
            MechError::ParticipantNotFound(id) => {
                Self::not_found(EntityKind::Character, format!("{id} on the encounter roster"))
            }
            other => Self::Turn(other),
        }
    }
}

impl From<CoreError> for TrackerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => Self::Validation(v),
            other => Self::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tt_core::{CharacterId, InstanceId};

    #[test]
    fn cross_instance_maps_to_cross_reference() {
        let err: TrackerError = MechError::CrossInstanceParticipant {
            character: CharacterId::new(),
            character_instance: InstanceId::new(),
            encounter_instance: InstanceId::new(),
        }
        .into();
        assert!(matches!(err, TrackerError::CrossReference(_)));

        let err: TrackerError = MechError::EmptyRoster.into();
        assert!(matches!(err, TrackerError::Turn(MechError::EmptyRoster)));
    }

    #[test]
    fn unseated_participant_maps_to_not_found() {
        let id = CharacterId::new();
        let err: TrackerError = MechError::ParticipantNotFound(id).into();
        assert!(matches!(
            err,
            TrackerError::NotFound {
                kind: EntityKind::Character,
                ..
            }
        ));
        assert!(err.to_string().starts_with(&format!("character not found: {id}")));
    }

    #[test]
    fn core_validation_is_unwrapped() {
        let err: TrackerError = CoreError::from(ValidationError::MissingPlayerIdentifier).into();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::MissingPlayerIdentifier)
        ));
    }

    #[test]
    fn not_found_message() {
        let err = TrackerError::not_found(EntityKind::Encounter, "abc123");
        assert_eq!(err.to_string(), "encounter not found: abc123");
    }
}
