use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::id::InstanceId;
use crate::tag::TagSet;

/// Lifecycle label of a game instance. Any status can move to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Currently being played.
    #[default]
    Active,
    /// On hold.
    Paused,
    /// Finished.
    Completed,
    /// Kept for reference only.
    Archived,
}

impl InstanceStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 4] = [Self::Active, Self::Paused, Self::Completed, Self::Archived];
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for InstanceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(CoreError::UnknownStatus(s.to_string())),
        }
    }
}

/// A game session or campaign. Owns characters and encounters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInstance {
    /// Unique identifier.
    pub id: InstanceId,
    /// Display name.
    pub name: String,
    /// Game system label, e.g. "Pathfinder 2e".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Lifecycle label.
    pub status: InstanceStatus,
    /// Free-form tags.
    #[serde(default, skip_serializing_if = "TagSet::is_empty")]
    pub tags: TagSet,
    /// GM notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the instance was created.
    pub created_at: DateTime<Utc>,
    /// When the instance was last opened or changed.
    pub last_accessed: DateTime<Utc>,
}

impl GameInstance {
    /// Create a new active instance.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: InstanceId::new(),
            name: name.into(),
            system: None,
            status: InstanceStatus::Active,
            tags: TagSet::new(),
            notes: None,
            created_at: now,
            last_accessed: now,
        }
    }

    /// Set the game system label.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// A copy with `last_accessed` refreshed.
    pub fn touched(&self) -> Self {
        let mut next = self.clone();
        next.last_accessed = Utc::now();
        next
    }

    /// Apply a patch. Always refreshes `last_accessed`.
    pub fn apply_patch(&self, patch: InstancePatch) -> Self {
        let mut next = self.touched();
        if let Some(name) = patch.name {
            next.name = name;
        }
        if let Some(system) = patch.system {
            next.system = system;
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        if let Some(tags) = patch.tags {
            next.tags = tags;
        }
        if let Some(notes) = patch.notes {
            next.notes = notes;
        }
        next
    }
}

/// A partial update to a game instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstancePatch {
    /// New name.
    pub name: Option<String>,
    /// New system label, or `Some(None)` to clear it.
    pub system: Option<Option<String>>,
    /// New status.
    pub status: Option<InstanceStatus>,
    /// Replacement tag set.
    pub tags: Option<TagSet>,
    /// New notes, or `Some(None)` to clear them.
    pub notes: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_instance_is_active() {
        let inst = GameInstance::new("Abomination Vaults");
        assert_eq!(inst.status, InstanceStatus::Active);
        assert_eq!(inst.created_at, inst.last_accessed);
    }

    #[test]
    fn patch_any_status_to_any_status() {
        let inst = GameInstance::new("Campaign");
        for from in InstanceStatus::ALL {
            let start = inst.apply_patch(InstancePatch {
                status: Some(from),
                ..Default::default()
            });
            for to in InstanceStatus::ALL {
                let next = start.apply_patch(InstancePatch {
                    status: Some(to),
                    ..Default::default()
                });
                assert_eq!(next.status, to);
            }
        }
    }

    #[test]
    fn patch_refreshes_last_accessed_and_clears_fields() {
        let inst = GameInstance::new("Campaign").with_system("PF2e");
        let next = inst.apply_patch(InstancePatch {
            system: Some(None),
            notes: Some(Some("Session zero done".to_string())),
            ..Default::default()
        });
        assert!(next.system.is_none());
        assert_eq!(next.notes.as_deref(), Some("Session zero done"));
        assert!(next.last_accessed >= inst.last_accessed);
        assert_eq!(next.created_at, inst.created_at);
    }

    #[test]
    fn status_parse_and_display() {
        for status in InstanceStatus::ALL {
            assert_eq!(status.to_string().parse::<InstanceStatus>().unwrap(), status);
        }
        assert!("finished".parse::<InstanceStatus>().is_err());
    }

    #[test]
    fn tags_omitted_when_empty() {
        let inst = GameInstance::new("Campaign");
        let json = serde_json::to_value(&inst).unwrap();
        assert!(json.get("tags").is_none());
        let back: GameInstance = serde_json::from_value(json).unwrap();
        assert!(back.tags.is_empty());
    }
}
