//! Immutable views over tracker state.
//!
//! A [`Snapshot`] is the full cached state at one point in time. Every
//! projection here is computed on demand from the three entity maps; none
//! of them is stored.

use std::collections::{BTreeMap, BTreeSet};

use tt_core::{Character, CharacterId, EncounterId, GameInstance, InstanceId, InstanceStatus};
use tt_mechanics::{Encounter, Participant};

use crate::error::{EntityKind, TrackerError, TrackerResult};
use crate::query::InstanceQuery;

/// The state of every instance, character, and encounter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub(crate) instances: BTreeMap<InstanceId, GameInstance>,
    pub(crate) characters: BTreeMap<CharacterId, Character>,
    pub(crate) encounters: BTreeMap<EncounterId, Encounter>,
}

impl Snapshot {
    /// Build a snapshot from loaded records.
    pub fn from_records(
        instances: impl IntoIterator<Item = GameInstance>,
        characters: impl IntoIterator<Item = Character>,
        encounters: impl IntoIterator<Item = Encounter>,
    ) -> Self {
        Self {
            instances: instances.into_iter().map(|i| (i.id, i)).collect(),
            characters: characters.into_iter().map(|c| (c.id, c)).collect(),
            encounters: encounters.into_iter().map(|e| (e.id, e)).collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Look up an instance.
    pub fn instance(&self, id: InstanceId) -> Option<&GameInstance> {
        self.instances.get(&id)
    }

    /// Look up a character.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Look up an encounter.
    pub fn encounter(&self, id: EncounterId) -> Option<&Encounter> {
        self.encounters.get(&id)
    }

    /// Every instance.
    pub fn instances(&self) -> impl Iterator<Item = &GameInstance> {
        self.instances.values()
    }

    /// Every character.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// Every encounter.
    pub fn encounters(&self) -> impl Iterator<Item = &Encounter> {
        self.encounters.values()
    }

    /// Look up an instance, failing with `NotFound`.
    pub fn require_instance(&self, id: InstanceId) -> TrackerResult<&GameInstance> {
        self.instance(id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Instance, id))
    }

    /// Look up a character, failing with `NotFound`.
    pub fn require_character(&self, id: CharacterId) -> TrackerResult<&Character> {
        self.character(id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Character, id))
    }

    /// Look up an encounter, failing with `NotFound`.
    pub fn require_encounter(&self, id: EncounterId) -> TrackerResult<&Encounter> {
        self.encounter(id)
            .ok_or_else(|| TrackerError::not_found(EntityKind::Encounter, id))
    }

    // -----------------------------------------------------------------------
    // Id resolution
    // -----------------------------------------------------------------------

    /// Resolve a full id or unique id prefix to an instance.
    pub fn resolve_instance(&self, prefix: &str) -> TrackerResult<InstanceId> {
        resolve(EntityKind::Instance, prefix, self.instances.keys(), |id, p| {
            id.matches_prefix(p)
        })
    }

    /// Resolve a full id or unique id prefix to a character.
    pub fn resolve_character(&self, prefix: &str) -> TrackerResult<CharacterId> {
        resolve(EntityKind::Character, prefix, self.characters.keys(), |id, p| {
            id.matches_prefix(p)
        })
    }

    /// Resolve a full id or unique id prefix to an encounter.
    pub fn resolve_encounter(&self, prefix: &str) -> TrackerResult<EncounterId> {
        resolve(EntityKind::Encounter, prefix, self.encounters.keys(), |id, p| {
            id.matches_prefix(p)
        })
    }

    // -----------------------------------------------------------------------
    // Ownership views
    // -----------------------------------------------------------------------

    /// Characters owned by an instance, sorted by name.
    pub fn characters_in(&self, instance: InstanceId) -> Vec<&Character> {
        let mut out: Vec<&Character> = self
            .characters
            .values()
            .filter(|c| c.instance_id == instance)
            .collect();
        out.sort_by_key(|c| c.name.to_lowercase());
        out
    }

    /// Encounters owned by an instance, sorted by name.
    pub fn encounters_in(&self, instance: InstanceId) -> Vec<&Encounter> {
        let mut out: Vec<&Encounter> = self
            .encounters
            .values()
            .filter(|e| e.instance_id == instance)
            .collect();
        out.sort_by_key(|e| e.name.to_lowercase());
        out
    }

    /// Characters and encounters whose owning instance no longer exists.
    pub fn orphans(&self) -> (Vec<CharacterId>, Vec<EncounterId>) {
        let characters = self
            .characters
            .values()
            .filter(|c| !self.instances.contains_key(&c.instance_id))
            .map(|c| c.id)
            .collect();
        let encounters = self
            .encounters
            .values()
            .filter(|e| !self.instances.contains_key(&e.instance_id))
            .map(|e| e.id)
            .collect();
        (characters, encounters)
    }

    // -----------------------------------------------------------------------
    // Instance views
    // -----------------------------------------------------------------------

    /// Start a filtered query over instances.
    pub fn query(&self) -> InstanceQuery<'_> {
        InstanceQuery::new(self)
    }

    /// Instances with the given status.
    pub fn instances_by_status(&self, status: InstanceStatus) -> Vec<&GameInstance> {
        self.query().status(status).execute()
    }

    /// Instances currently being played.
    pub fn active_instances(&self) -> Vec<&GameInstance> {
        self.instances_by_status(InstanceStatus::Active)
    }

    /// Instances grouped by status. Statuses with no instances are omitted.
    pub fn instances_grouped_by_status(&self) -> BTreeMap<InstanceStatus, Vec<&GameInstance>> {
        let mut groups: BTreeMap<InstanceStatus, Vec<&GameInstance>> = BTreeMap::new();
        for inst in self.query().execute() {
            groups.entry(inst.status).or_default().push(inst);
        }
        groups
    }

    /// Instances grouped by tag. An instance with N tags appears in N
    /// groups; untagged instances appear in none.
    pub fn instances_grouped_by_tag(&self) -> BTreeMap<String, Vec<&GameInstance>> {
        let mut groups: BTreeMap<String, Vec<&GameInstance>> = BTreeMap::new();
        for inst in self.query().execute() {
            for tag in inst.tags.iter() {
                groups.entry(tag.to_string()).or_default().push(inst);
            }
        }
        groups
    }

    /// Every tag in use, deduplicated and sorted.
    pub fn all_tags(&self) -> Vec<String> {
        self.instances
            .values()
            .flat_map(|i| i.tags.iter())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Encounter views
    // -----------------------------------------------------------------------

    /// Participants acting in the current initiative slot, joined with
    /// their characters. Participants whose character no longer exists are
    /// left out.
    pub fn current_participants(
        &self,
        encounter: EncounterId,
    ) -> TrackerResult<Vec<(&Participant, &Character)>> {
        let enc = self.require_encounter(encounter)?;
        Ok(enc
            .current_participants()
            .into_iter()
            .filter_map(|p| match self.characters.get(&p.character_id) {
                Some(c) => Some((p, c)),
                None => {
                    tracing::warn!(
                        encounter = %enc.id,
                        character = %p.character_id,
                        "skipping participant with missing character"
                    );
                    None
                }
            })
            .collect())
    }

    /// Roster entries whose character has been deleted.
    pub fn dangling_participants(&self, encounter: EncounterId) -> TrackerResult<Vec<CharacterId>> {
        let enc = self.require_encounter(encounter)?;
        Ok(enc
            .participants()
            .iter()
            .map(|p| p.character_id)
            .filter(|id| !self.characters.contains_key(id))
            .collect())
    }
}

fn resolve<'a, I, F>(
    kind: EntityKind,
    prefix: &str,
    ids: impl Iterator<Item = &'a I>,
    matches: F,
) -> TrackerResult<I>
where
    I: Copy + 'a,
    F: Fn(&I, &str) -> bool,
{
    let prefix = prefix.trim();
    let found: Vec<I> = ids.filter(|id| matches(*id, prefix)).copied().collect();
    match found.as_slice() {
        [id] => Ok(*id),
        [] => Err(TrackerError::not_found(kind, prefix)),
        many => Err(TrackerError::Ambiguous {
            kind,
            prefix: prefix.to_string(),
            matches: many.len(),
        }),
    }
}
