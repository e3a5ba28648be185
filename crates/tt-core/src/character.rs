use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::id::{CharacterId, InstanceId};
use crate::validate::validate_draft;

/// The kind of character, without any of the type-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterType {
    /// A player character, controlled by a player.
    Pc,
    /// A non-player character run by the GM.
    Npc,
    /// A trap or environmental hazard that takes turns.
    Hazard,
    /// A familiar bound to another character.
    Familiar,
    /// An eidolon bound to a summoner.
    Eidolon,
    /// An animal companion or similar ally.
    Companion,
}

impl CharacterType {
    /// All character types, in display order.
    pub const ALL: [Self; 6] = [
        Self::Pc,
        Self::Npc,
        Self::Hazard,
        Self::Familiar,
        Self::Eidolon,
        Self::Companion,
    ];

    /// Returns true for types that exist only in relation to another character.
    pub fn requires_related(self) -> bool {
        matches!(self, Self::Familiar | Self::Eidolon | Self::Companion)
    }
}

impl fmt::Display for CharacterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pc => write!(f, "PC"),
            Self::Npc => write!(f, "NPC"),
            Self::Hazard => write!(f, "Hazard"),
            Self::Familiar => write!(f, "Familiar"),
            Self::Eidolon => write!(f, "Eidolon"),
            Self::Companion => write!(f, "Companion"),
        }
    }
}

impl FromStr for CharacterType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "pc" | "player" => Ok(Self::Pc),
            "npc" => Ok(Self::Npc),
            "hazard" => Ok(Self::Hazard),
            "familiar" => Ok(Self::Familiar),
            "eidolon" => Ok(Self::Eidolon),
            "companion" => Ok(Self::Companion),
            _ => Err(CoreError::UnknownCharacterType(s.to_string())),
        }
    }
}

/// Hit point state: current, maximum, and an optional temporary buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    /// Current hit points.
    pub current: i32,
    /// Maximum hit points.
    pub max: i32,
    /// Temporary hit points, consumed before current HP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<i32>,
}

impl HitPoints {
    /// Full health with no temporary HP.
    pub fn full(max: i32) -> Self {
        Self {
            current: max,
            max,
            temp: None,
        }
    }

    /// Temporary HP, treating an absent buffer as zero.
    pub fn temp_or_zero(&self) -> i32 {
        self.temp.unwrap_or(0)
    }
}

impl fmt::Display for HitPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)?;
        match self.temp {
            Some(t) if t > 0 => write!(f, " (+{t})"),
            _ => Ok(()),
        }
    }
}

/// Type-specific character data. Each variant carries exactly the fields
/// its type requires, so a stored character cannot be missing a player
/// identifier or a related character. Non-player types may still be linked
/// to a player, e.g. a companion a player runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CharacterKind {
    /// A player character.
    Pc {
        /// Identifier linking the character to a player in an external system.
        player_id: String,
    },
    /// A non-player character.
    Npc {
        /// Optional player link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
    /// A hazard.
    Hazard {
        /// Optional player link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
    /// A familiar.
    Familiar {
        /// The character this familiar belongs to.
        related_character_id: CharacterId,
        /// Optional player link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
    /// An eidolon.
    Eidolon {
        /// The summoner.
        related_character_id: CharacterId,
        /// Optional player link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
    /// A companion.
    Companion {
        /// The character this companion accompanies.
        related_character_id: CharacterId,
        /// Optional player link.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_id: Option<String>,
    },
}

impl CharacterKind {
    /// The bare type of this kind.
    pub fn character_type(&self) -> CharacterType {
        match self {
            Self::Pc { .. } => CharacterType::Pc,
            Self::Npc { .. } => CharacterType::Npc,
            Self::Hazard { .. } => CharacterType::Hazard,
            Self::Familiar { .. } => CharacterType::Familiar,
            Self::Eidolon { .. } => CharacterType::Eidolon,
            Self::Companion { .. } => CharacterType::Companion,
        }
    }

    /// The related character, for bound types.
    pub fn related_character(&self) -> Option<CharacterId> {
        match self {
            Self::Familiar {
                related_character_id,
                ..
            }
            | Self::Eidolon {
                related_character_id,
                ..
            }
            | Self::Companion {
                related_character_id,
                ..
            } => Some(*related_character_id),
            _ => None,
        }
    }

    /// The player identifier. Always present for player characters.
    pub fn player_id(&self) -> Option<&str> {
        match self {
            Self::Pc { player_id } => Some(player_id),
            Self::Npc { player_id }
            | Self::Hazard { player_id }
            | Self::Familiar { player_id, .. }
            | Self::Eidolon { player_id, .. }
            | Self::Companion { player_id, .. } => player_id.as_deref(),
        }
    }
}

/// A character tracked inside a game instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier, never changes.
    pub id: CharacterId,
    /// The instance that owns this character.
    pub instance_id: InstanceId,
    /// Display name.
    pub name: String,
    /// Type and the fields that go with it.
    #[serde(flatten)]
    pub kind: CharacterKind,
    /// Hit points.
    pub hp: HitPoints,
    /// Armor class.
    pub ac: i32,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// The bare character type.
    pub fn character_type(&self) -> CharacterType {
        self.kind.character_type()
    }

    /// Loosen this character back into a draft, e.g. to merge a patch.
    pub fn to_draft(&self) -> CharacterDraft {
        CharacterDraft {
            name: self.name.clone(),
            character_type: self.character_type(),
            related_character_id: self.kind.related_character(),
            player_id: self.kind.player_id().map(str::to_string),
            hp: self.hp,
            ac: self.ac,
        }
    }

    /// Re-run every validation rule against this character.
    pub fn validate(&self) -> CoreResult<()> {
        validate_draft(&self.to_draft())?;
        Ok(())
    }

    /// Merge a patch onto this character, validate the result, and stamp
    /// the update time. Identity and ownership are preserved.
    pub fn apply_patch(&self, patch: CharacterPatch) -> CoreResult<Self> {
        let mut draft = self.to_draft();
        if let Some(name) = patch.name {
            draft.name = name;
        }
        if let Some(t) = patch.character_type {
            draft.character_type = t;
        }
        if let Some(related) = patch.related_character_id {
            draft.related_character_id = related;
        }
        if let Some(player) = patch.player_id {
            draft.player_id = player;
        }
        if let Some(hp) = patch.hp {
            draft.hp = hp;
        }
        if let Some(ac) = patch.ac {
            draft.ac = ac;
        }
        draft.build_with_id(self.id, self.instance_id)
    }

    /// Replace the hit points, validating the result.
    pub fn with_hp(&self, hp: HitPoints) -> CoreResult<Self> {
        self.apply_patch(CharacterPatch {
            hp: Some(hp),
            ..Default::default()
        })
    }

    /// Replace the armor class.
    pub fn with_ac(&self, ac: i32) -> CoreResult<Self> {
        self.apply_patch(CharacterPatch {
            ac: Some(ac),
            ..Default::default()
        })
    }
}

/// Caller-supplied character data before validation.
///
/// Unlike [`Character`], a draft can express invalid combinations (a
/// familiar without an owner, an NPC with one); [`CharacterDraft::build`]
/// rejects those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    /// Display name.
    pub name: String,
    /// Character type.
    pub character_type: CharacterType,
    /// Related character, required for bound types only.
    pub related_character_id: Option<CharacterId>,
    /// Player identifier, required for player characters.
    pub player_id: Option<String>,
    /// Initial hit points.
    pub hp: HitPoints,
    /// Initial armor class.
    pub ac: i32,
}

impl CharacterDraft {
    /// Start a draft with full HP and no type-specific data.
    pub fn new(name: impl Into<String>, character_type: CharacterType, max_hp: i32, ac: i32) -> Self {
        Self {
            name: name.into(),
            character_type,
            related_character_id: None,
            player_id: None,
            hp: HitPoints::full(max_hp),
            ac,
        }
    }

    /// Set the player identifier.
    pub fn with_player(mut self, player_id: impl Into<String>) -> Self {
        self.player_id = Some(player_id.into());
        self
    }

    /// Set the related character.
    pub fn with_related(mut self, related: CharacterId) -> Self {
        self.related_character_id = Some(related);
        self
    }

    /// Set explicit hit points.
    pub fn with_hp(mut self, hp: HitPoints) -> Self {
        self.hp = hp;
        self
    }

    /// Validate and build a new character with a fresh ID.
    pub fn build(self, instance_id: InstanceId) -> CoreResult<Character> {
        self.build_with_id(CharacterId::new(), instance_id)
    }

    /// Validate and build a character with a pre-assigned ID.
    pub fn build_with_id(self, id: CharacterId, instance_id: InstanceId) -> CoreResult<Character> {
        validate_draft(&self)?;
        let player_id = self.player_id.filter(|p| !p.trim().is_empty());
        let kind = match (self.character_type, self.related_character_id, player_id) {
            (CharacterType::Pc, _, Some(player_id)) => CharacterKind::Pc { player_id },
            (CharacterType::Npc, _, player_id) => CharacterKind::Npc { player_id },
            (CharacterType::Hazard, _, player_id) => CharacterKind::Hazard { player_id },
            (CharacterType::Familiar, Some(related_character_id), player_id) => {
                CharacterKind::Familiar {
                    related_character_id,
                    player_id,
                }
            }
            (CharacterType::Eidolon, Some(related_character_id), player_id) => {
                CharacterKind::Eidolon {
                    related_character_id,
                    player_id,
                }
            }
            (CharacterType::Companion, Some(related_character_id), player_id) => {
                CharacterKind::Companion {
                    related_character_id,
                    player_id,
                }
            }
            // validate_draft rejects every remaining combination
            (t, None, _) if t.requires_related() => {
                return Err(crate::error::ValidationError::MissingRelatedCharacter(t).into());
            }
            _ => return Err(crate::error::ValidationError::MissingPlayerIdentifier.into()),
        };
        Ok(Character {
            id,
            instance_id,
            name: self.name,
            kind,
            hp: self.hp,
            ac: self.ac,
            updated_at: Utc::now(),
        })
    }
}

/// A partial update to a character. `None` leaves a field unchanged; the
/// doubly optional fields use `Some(None)` to clear a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterPatch {
    /// New name.
    pub name: Option<String>,
    /// New character type.
    pub character_type: Option<CharacterType>,
    /// New related character, or `Some(None)` to clear it.
    pub related_character_id: Option<Option<CharacterId>>,
    /// New player identifier, or `Some(None)` to clear it.
    pub player_id: Option<Option<String>>,
    /// Replacement hit points.
    pub hp: Option<HitPoints>,
    /// Replacement armor class.
    pub ac: Option<i32>,
}

impl CharacterPatch {
    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn instance() -> InstanceId {
        InstanceId::new()
    }

    #[test]
    fn build_pc_keeps_player_id() {
        let pc = CharacterDraft::new("Valeros", CharacterType::Pc, 20, 18)
            .with_player("discord:1234")
            .build(instance())
            .unwrap();
        assert_eq!(pc.kind.player_id(), Some("discord:1234"));
        assert_eq!(pc.character_type(), CharacterType::Pc);
        assert_eq!(pc.hp, HitPoints::full(20));
    }

    #[test]
    fn build_familiar_keeps_related() {
        let owner = CharacterId::new();
        let familiar = CharacterDraft::new("Skitter", CharacterType::Familiar, 5, 14)
            .with_related(owner)
            .build(instance())
            .unwrap();
        assert_eq!(familiar.kind.related_character(), Some(owner));
    }

    #[test]
    fn build_keeps_player_link_on_non_pc() {
        let owner = CharacterId::new();
        let companion = CharacterDraft::new("Nok-Nok", CharacterType::Companion, 12, 16)
            .with_related(owner)
            .with_player("discord:77")
            .build(instance())
            .unwrap();
        assert_eq!(companion.kind.player_id(), Some("discord:77"));
        assert_eq!(companion.to_draft().player_id.as_deref(), Some("discord:77"));

        let npc = CharacterDraft::new("Oleg", CharacterType::Npc, 10, 12)
            .with_player("  ")
            .build(instance())
            .unwrap();
        assert_eq!(npc.kind, CharacterKind::Npc { player_id: None });

        let json = serde_json::to_value(&companion).unwrap();
        assert_eq!(json["player_id"], "discord:77");
        let back: Character = serde_json::from_value(json).unwrap();
        assert_eq!(back, companion);
    }

    #[test]
    fn build_rejects_familiar_without_owner() {
        let err = CharacterDraft::new("Skitter", CharacterType::Familiar, 5, 14)
            .build(instance())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MissingRelatedCharacter(CharacterType::Familiar))
        ));
    }

    #[test]
    fn patch_changes_type_and_revalidates() {
        let npc = CharacterDraft::new("Amiri", CharacterType::Npc, 30, 16)
            .build(instance())
            .unwrap();

        let err = npc
            .apply_patch(CharacterPatch {
                character_type: Some(CharacterType::Pc),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MissingPlayerIdentifier)
        ));

        let pc = npc
            .apply_patch(CharacterPatch {
                character_type: Some(CharacterType::Pc),
                player_id: Some(Some("amiri-player".to_string())),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(pc.id, npc.id);
        assert_eq!(pc.instance_id, npc.instance_id);
        assert_eq!(pc.kind.player_id(), Some("amiri-player"));
    }

    #[test]
    fn patch_stamps_updated_at() {
        let npc = CharacterDraft::new("Amiri", CharacterType::Npc, 30, 16)
            .build(instance())
            .unwrap();
        let renamed = npc
            .apply_patch(CharacterPatch {
                name: Some("Amiri the Bold".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(renamed.name, "Amiri the Bold");
        assert!(renamed.updated_at >= npc.updated_at);
    }

    #[test]
    fn serde_flattens_kind() {
        let owner = CharacterId::new();
        let eidolon = CharacterDraft::new("Radiant", CharacterType::Eidolon, 12, 15)
            .with_related(owner)
            .build(instance())
            .unwrap();
        let json = serde_json::to_value(&eidolon).unwrap();
        assert_eq!(json["type"], "eidolon");
        assert_eq!(json["related_character_id"], owner.0.to_string());
        assert!(json.get("instance_id").is_some());

        let back: Character = serde_json::from_value(json).unwrap();
        assert_eq!(back, eidolon);
    }

    #[test]
    fn parse_character_type() {
        assert_eq!("PC".parse::<CharacterType>().unwrap(), CharacterType::Pc);
        assert_eq!(
            " companion ".parse::<CharacterType>().unwrap(),
            CharacterType::Companion
        );
        assert!("dragon".parse::<CharacterType>().is_err());
    }

    #[test]
    fn hit_points_display() {
        let hp = HitPoints {
            current: 7,
            max: 10,
            temp: Some(3),
        };
        assert_eq!(hp.to_string(), "7/10 (+3)");
        assert_eq!(HitPoints::full(10).to_string(), "10/10");
    }
}
