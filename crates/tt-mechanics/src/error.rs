//! Error types for the mechanics engine.

use tt_core::{CharacterId, InstanceId};

/// Errors that can occur during mechanics operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// A turn cannot advance with nobody on the roster.
    #[error("encounter has no participants")]
    EmptyRoster,

    /// The character belongs to a different instance than the encounter.
    #[error("character {character} belongs to instance {character_instance}, not {encounter_instance}")]
    CrossInstanceParticipant {
        /// The rejected character.
        character: CharacterId,
        /// The instance owning the character.
        character_instance: InstanceId,
        /// The instance owning the encounter.
        encounter_instance: InstanceId,
    },

    /// The character is not on the encounter's roster.
    #[error("character {0} is not participating in this encounter")]
    ParticipantNotFound(CharacterId),

    /// The character is already on the encounter's roster.
    #[error("character {0} is already participating in this encounter")]
    AlreadyParticipating(CharacterId),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
