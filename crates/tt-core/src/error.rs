use crate::character::CharacterType;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// A character invariant that a candidate state violates.
///
/// Variants are listed in the order the validator checks them; the first
/// failing rule is the one reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Familiars, eidolons, and companions must name the character they belong to.
    #[error("{0} characters must reference a related character")]
    MissingRelatedCharacter(CharacterType),

    /// Only familiars, eidolons, and companions may reference a related character.
    #[error("{0} characters must not reference a related character")]
    UnexpectedRelatedCharacter(CharacterType),

    /// Player characters must carry a player identifier.
    #[error("player characters must have a player identifier")]
    MissingPlayerIdentifier,

    /// Current hit points are above the maximum.
    #[error("current HP {current} exceeds maximum {max}")]
    HpExceedsMax {
        /// The offending current HP.
        current: i32,
        /// The maximum HP.
        max: i32,
    },

    /// Temporary hit points are negative.
    #[error("temporary HP must not be negative (got {0})")]
    NegativeTempHp(i32),
}

/// Errors raised by the core data model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A candidate character failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A character type name could not be parsed.
    #[error("unknown character type: \"{0}\"")]
    UnknownCharacterType(String),

    /// An instance status name could not be parsed.
    #[error("unknown instance status: \"{0}\"")]
    UnknownStatus(String),
}
