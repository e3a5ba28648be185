//! Character validation rules.
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. bound types (familiar, eidolon, companion) need a related character
//! 2. every other type must not have one
//! 3. player characters need a player identifier
//! 4. current HP must not exceed maximum HP
//! 5. temporary HP, when present, must not be negative

use crate::character::{CharacterDraft, CharacterType, HitPoints};
use crate::error::ValidationError;

/// Validate a candidate character. Pure; performs no I/O.
pub fn validate_draft(draft: &CharacterDraft) -> Result<(), ValidationError> {
    validate_relations(
        draft.character_type,
        draft.related_character_id.is_some(),
        draft.player_id.as_deref(),
    )?;
    validate_hp(&draft.hp)
}

fn validate_relations(
    character_type: CharacterType,
    has_related: bool,
    player_id: Option<&str>,
) -> Result<(), ValidationError> {
    if character_type.requires_related() && !has_related {
        return Err(ValidationError::MissingRelatedCharacter(character_type));
    }
    if !character_type.requires_related() && has_related {
        return Err(ValidationError::UnexpectedRelatedCharacter(character_type));
    }
    let has_player = player_id.is_some_and(|p| !p.trim().is_empty());
    if character_type == CharacterType::Pc && !has_player {
        return Err(ValidationError::MissingPlayerIdentifier);
    }
    Ok(())
}

/// Check the hit point invariants (rules 4 and 5).
pub fn validate_hp(hp: &HitPoints) -> Result<(), ValidationError> {
    if hp.current > hp.max {
        return Err(ValidationError::HpExceedsMax {
            current: hp.current,
            max: hp.max,
        });
    }
    if let Some(temp) = hp.temp
        && temp < 0
    {
        return Err(ValidationError::NegativeTempHp(temp));
    }
    Ok(())
}
