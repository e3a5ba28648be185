//! A character's seat on an encounter roster.

use serde::{Deserialize, Serialize};

use tt_core::{CharacterId, HitPoints, TagSet};

/// A participant in an encounter.
///
/// Only `character_id` and `initiative` drive the turn engine. The other
/// fields are per-encounter combat notes and never affect turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The character occupying this seat. Lookup only; the character may
    /// since have been deleted.
    pub character_id: CharacterId,
    /// Initiative score (higher acts first).
    pub initiative: i32,
    /// Free-form status label, e.g. "prone" or "delaying".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Hit points tracked for this encounter only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<HitPoints>,
    /// Conditions currently applied.
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub conditions: TagSet,
}

impl Participant {
    /// Seat a character at the given initiative.
    pub fn new(character_id: CharacterId, initiative: i32) -> Self {
        Self {
            character_id,
            initiative,
            status: None,
            hp: None,
            conditions: TagSet::new(),
        }
    }
}
