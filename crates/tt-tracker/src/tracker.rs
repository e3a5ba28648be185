//! The coordinating state container.
//!
//! `Tracker` owns the store and the cached [`Snapshot`]. Every command reads
//! the cache, computes the next state in memory, validates it, and commits
//! one write batch. Only after the commit succeeds is a new snapshot
//! published to the cache and to subscribers.

use std::sync::Arc;

use tokio::sync::watch;

use tt_core::validate::validate_hp;
use tt_core::{
    Character, CharacterDraft, CharacterId, CharacterPatch, EncounterId, GameInstance, HitPoints,
    InstanceId, InstancePatch, InstanceStatus, TagSet,
};
use tt_mechanics::{AcChange, Encounter, HpChange, MechResult};
use tt_store::{Index, Store, StoreExt, WriteBatch};

use crate::config::{CascadePolicy, TrackerConfig};
use crate::error::{TrackerError, TrackerResult};
use crate::snapshot::Snapshot;

/// Entities removed by a cascade delete or an orphan sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    /// Deleted characters.
    pub characters: Vec<CharacterId>,
    /// Deleted encounters.
    pub encounters: Vec<EncounterId>,
}

impl RemovalReport {
    /// Returns true if nothing was removed.
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.encounters.is_empty()
    }
}

/// Tabletop game state backed by a [`Store`].
pub struct Tracker<S: Store> {
    store: S,
    config: TrackerConfig,
    state: watch::Sender<Arc<Snapshot>>,
}

impl<S: Store> Tracker<S> {
    /// Load every record from the store into a fresh cache.
    pub fn open(store: S, config: TrackerConfig) -> TrackerResult<Self> {
        let snapshot = Snapshot::from_records(
            store.records::<GameInstance>()?,
            store.records::<Character>()?,
            store.records::<Encounter>()?,
        );
        tracing::info!(
            instances = snapshot.instances.len(),
            characters = snapshot.characters.len(),
            encounters = snapshot.encounters.len(),
            "loaded tracker state"
        );
        let (state, _) = watch::channel(Arc::new(snapshot));
        Ok(Self {
            store,
            config,
            state,
        })
    }

    /// The current state.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.state.borrow())
    }

    /// Watch for new snapshots. The receiver sees every committed change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.state.subscribe()
    }

    /// The active configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Instances
    // -----------------------------------------------------------------------

    /// Create a new, active instance.
    pub fn create_instance(
        &mut self,
        name: impl Into<String>,
        system: Option<String>,
        tags: TagSet,
    ) -> TrackerResult<GameInstance> {
        let mut inst = GameInstance::new(name).with_tags(tags);
        inst.system = system.filter(|s| !s.trim().is_empty());
        let inst = self.save_instance(inst)?;
        tracing::debug!(instance = %inst.id, name = %inst.name, "created instance");
        Ok(inst)
    }

    /// Apply a patch to an instance. Refreshes its last-accessed time.
    pub fn update_instance(
        &mut self,
        id: InstanceId,
        patch: InstancePatch,
    ) -> TrackerResult<GameInstance> {
        let next = self.snapshot().require_instance(id)?.apply_patch(patch);
        let inst = self.save_instance(next)?;
        tracing::debug!(instance = %inst.id, "updated instance");
        Ok(inst)
    }

    /// Refresh an instance's last-accessed time.
    pub fn touch_instance(&mut self, id: InstanceId) -> TrackerResult<GameInstance> {
        let next = self.snapshot().require_instance(id)?.touched();
        self.save_instance(next)
    }

    /// Change an instance's status. Any status may follow any other.
    pub fn set_instance_status(
        &mut self,
        id: InstanceId,
        status: InstanceStatus,
    ) -> TrackerResult<GameInstance> {
        self.update_instance(
            id,
            InstancePatch {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    /// Delete an instance and, per the cascade policy, everything it owns.
    /// The instance and its dependents go in one atomic batch.
    pub fn delete_instance(&mut self, id: InstanceId) -> TrackerResult<RemovalReport> {
        let snap = self.snapshot();
        snap.require_instance(id)?;

        let characters: Vec<Character> = self.store.records_by_index(Index::InstanceId, id.0)?;
        let encounters: Vec<Encounter> = match self.config.cascade {
            CascadePolicy::CharactersAndEncounters => {
                self.store.records_by_index(Index::InstanceId, id.0)?
            }
            CascadePolicy::CharactersOnly => Vec::new(),
        };

        let report = RemovalReport {
            characters: characters.iter().map(|c| c.id).collect(),
            encounters: encounters.iter().map(|e| e.id).collect(),
        };

        let mut batch = WriteBatch::new();
        for c in &report.characters {
            batch.delete_record::<Character>(c.0);
        }
        for e in &report.encounters {
            batch.delete_record::<Encounter>(e.0);
        }
        batch.delete_record::<GameInstance>(id.0);

        self.commit(batch, |s| {
            s.instances.remove(&id);
            for c in &report.characters {
                s.characters.remove(c);
            }
            for e in &report.encounters {
                s.encounters.remove(e);
            }
        })?;

        tracing::info!(
            instance = %id,
            characters = report.characters.len(),
            encounters = report.encounters.len(),
            policy = %self.config.cascade,
            "deleted instance"
        );
        let left = snap
            .encounters_in(id)
            .len()
            .saturating_sub(report.encounters.len());
        if left > 0 {
            tracing::debug!(instance = %id, encounters = left, "encounters kept after instance delete");
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Create a character in an existing instance.
    pub fn create_character(
        &mut self,
        instance_id: InstanceId,
        draft: CharacterDraft,
    ) -> TrackerResult<Character> {
        let snap = self.snapshot();
        snap.require_instance(instance_id)?;
        let character = draft.build(instance_id)?;
        check_related(&snap, &character)?;
        let character = self.save_character(character)?;
        tracing::debug!(
            character = %character.id,
            name = %character.name,
            kind = %character.character_type(),
            "created character"
        );
        Ok(character)
    }

    /// Merge a patch onto a character and re-validate the result.
    pub fn update_character(
        &mut self,
        id: CharacterId,
        patch: CharacterPatch,
    ) -> TrackerResult<Character> {
        let snap = self.snapshot();
        let next = snap.require_character(id)?.apply_patch(patch)?;
        check_related(&snap, &next)?;
        let character = self.save_character(next)?;
        tracing::debug!(character = %id, "updated character");
        Ok(character)
    }

    /// Delete a character. Encounter rosters keep their reference to it.
    pub fn delete_character(&mut self, id: CharacterId) -> TrackerResult<Character> {
        let snap = self.snapshot();
        let removed = snap.require_character(id)?.clone();

        let mut batch = WriteBatch::new();
        batch.delete_record::<Character>(id.0);
        self.commit(batch, |s| {
            s.characters.remove(&id);
        })?;

        let seated = snap
            .encounters()
            .filter(|e| e.participant(id).is_some())
            .count();
        tracing::debug!(character = %id, seated, "deleted character");
        Ok(removed)
    }

    /// Set maximum HP, clamping current HP to it.
    pub fn set_max_hp(&mut self, id: CharacterId, max: i32) -> TrackerResult<Character> {
        self.change_hp(id, HpChange::SetMax(max))
    }

    /// Set current HP, clamped to `0..=max`.
    pub fn set_current_hp(&mut self, id: CharacterId, value: i32) -> TrackerResult<Character> {
        self.change_hp(id, HpChange::SetCurrent(value))
    }

    /// Set temporary HP, floored at 0.
    pub fn set_temp_hp(&mut self, id: CharacterId, value: i32) -> TrackerResult<Character> {
        self.change_hp(id, HpChange::SetTemp(value))
    }

    /// Deal damage. Temporary HP absorbs it first.
    pub fn damage(&mut self, id: CharacterId, amount: i32) -> TrackerResult<Character> {
        self.change_hp(id, HpChange::Damage(amount))
    }

    /// Heal, up to maximum HP.
    pub fn heal(&mut self, id: CharacterId, amount: i32) -> TrackerResult<Character> {
        self.change_hp(id, HpChange::Heal(amount))
    }

    /// Replace armor class.
    pub fn set_ac(&mut self, id: CharacterId, ac: i32) -> TrackerResult<Character> {
        self.change_ac(id, AcChange::Set(ac))
    }

    /// Adjust armor class by a signed delta.
    pub fn modify_ac(&mut self, id: CharacterId, delta: i32) -> TrackerResult<Character> {
        self.change_ac(id, AcChange::Modify(delta))
    }

    fn change_hp(&mut self, id: CharacterId, change: HpChange) -> TrackerResult<Character> {
        let snap = self.snapshot();
        let current = snap.require_character(id)?;
        let next = current.with_hp(change.apply(current.hp))?;
        let character = self.save_character(next)?;
        tracing::debug!(character = %id, %change, hp = %character.hp, "hit points changed");
        Ok(character)
    }

    fn change_ac(&mut self, id: CharacterId, change: AcChange) -> TrackerResult<Character> {
        let snap = self.snapshot();
        let current = snap.require_character(id)?;
        let next = current.with_ac(change.apply(current.ac))?;
        let character = self.save_character(next)?;
        tracing::debug!(character = %id, %change, ac = character.ac, "armor class changed");
        Ok(character)
    }

    // -----------------------------------------------------------------------
    // Encounters
    // -----------------------------------------------------------------------

    /// Create an empty encounter in an existing instance.
    pub fn create_encounter(
        &mut self,
        instance_id: InstanceId,
        name: impl Into<String>,
    ) -> TrackerResult<Encounter> {
        self.snapshot().require_instance(instance_id)?;
        let enc = self.save_encounter(Encounter::new(instance_id, name))?;
        tracing::debug!(encounter = %enc.id, name = %enc.name, "created encounter");
        Ok(enc)
    }

    /// Rename an encounter.
    pub fn rename_encounter(
        &mut self,
        id: EncounterId,
        name: impl Into<String>,
    ) -> TrackerResult<Encounter> {
        let name = name.into();
        self.modify_encounter(id, |enc| {
            enc.name = name;
            Ok(())
        })
    }

    /// Delete an encounter.
    pub fn delete_encounter(&mut self, id: EncounterId) -> TrackerResult<Encounter> {
        let removed = self.snapshot().require_encounter(id)?.clone();
        let mut batch = WriteBatch::new();
        batch.delete_record::<Encounter>(id.0);
        self.commit(batch, |s| {
            s.encounters.remove(&id);
        })?;
        tracing::debug!(encounter = %id, "deleted encounter");
        Ok(removed)
    }

    /// Seat a character. It must exist and share the encounter's instance.
    pub fn add_participant(
        &mut self,
        encounter: EncounterId,
        character: CharacterId,
        initiative: i32,
    ) -> TrackerResult<Encounter> {
        let character = self.snapshot().require_character(character)?.clone();
        self.modify_encounter(encounter, |enc| enc.add_participant(&character, initiative))
    }

    /// Remove a character from the roster.
    pub fn remove_participant(
        &mut self,
        encounter: EncounterId,
        character: CharacterId,
    ) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| enc.remove_participant(character).map(|_| ()))
    }

    /// Change one participant's initiative, repairing the current turn.
    pub fn update_participant_initiative(
        &mut self,
        encounter: EncounterId,
        character: CharacterId,
        initiative: i32,
    ) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| {
            enc.update_participant_initiative(character, initiative)
        })
    }

    /// Change many initiatives at once. Unknown characters are ignored and
    /// the current turn is left alone.
    pub fn bulk_update_initiatives(
        &mut self,
        encounter: EncounterId,
        updates: &[(CharacterId, i32)],
    ) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| {
            let updated = enc.bulk_update_initiatives(updates.iter().copied());
            tracing::debug!(encounter = %enc.id, updated, "bulk initiative update");
            Ok(())
        })
    }

    /// Advance to the next initiative slot.
    pub fn next_turn(&mut self, encounter: EncounterId) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| {
            if enc.next_turn()? {
                tracing::info!(encounter = %enc.id, round = enc.round, "new round");
            }
            Ok(())
        })
    }

    /// Return an encounter to round 0, keeping the roster.
    pub fn reset_encounter(&mut self, encounter: EncounterId) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| {
            enc.reset();
            Ok(())
        })
    }

    /// Set or clear a participant's status label.
    pub fn set_participant_status(
        &mut self,
        encounter: EncounterId,
        character: CharacterId,
        status: Option<String>,
    ) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| enc.set_participant_status(character, status))
    }

    /// Set or clear a participant's encounter-scoped hit points.
    pub fn set_participant_hp(
        &mut self,
        encounter: EncounterId,
        character: CharacterId,
        hp: Option<HitPoints>,
    ) -> TrackerResult<Encounter> {
        if let Some(hp) = &hp {
            validate_hp(hp)?;
        }
        self.modify_encounter(encounter, |enc| enc.set_participant_hp(character, hp))
    }

    /// Apply a condition to a participant.
    pub fn add_condition(
        &mut self,
        encounter: EncounterId,
        character: CharacterId,
        condition: &str,
    ) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| {
            enc.add_condition(character, condition).map(|_| ())
        })
    }

    /// Remove a condition from a participant.
    pub fn remove_condition(
        &mut self,
        encounter: EncounterId,
        character: CharacterId,
        condition: &str,
    ) -> TrackerResult<Encounter> {
        self.modify_encounter(encounter, |enc| {
            enc.remove_condition(character, condition).map(|_| ())
        })
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// Delete characters and encounters whose instance no longer exists.
    pub fn sweep_orphans(&mut self) -> TrackerResult<RemovalReport> {
        let (characters, encounters) = self.snapshot().orphans();
        let report = RemovalReport {
            characters,
            encounters,
        };
        if report.is_empty() {
            return Ok(report);
        }

        let mut batch = WriteBatch::new();
        for c in &report.characters {
            batch.delete_record::<Character>(c.0);
        }
        for e in &report.encounters {
            batch.delete_record::<Encounter>(e.0);
        }
        self.commit(batch, |s| {
            for c in &report.characters {
                s.characters.remove(c);
            }
            for e in &report.encounters {
                s.encounters.remove(e);
            }
        })?;

        tracing::warn!(
            characters = report.characters.len(),
            encounters = report.encounters.len(),
            "swept orphaned records"
        );
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Commit path
    // -----------------------------------------------------------------------

    /// Commit a batch, then publish the snapshot produced by `update`.
    /// Nothing is published if the commit fails.
    fn commit(&mut self, batch: WriteBatch, update: impl FnOnce(&mut Snapshot)) -> TrackerResult<()> {
        self.store.commit(batch)?;
        let mut next = Snapshot::clone(&self.snapshot());
        update(&mut next);
        self.state.send_replace(Arc::new(next));
        Ok(())
    }

    fn save_instance(&mut self, inst: GameInstance) -> TrackerResult<GameInstance> {
        let mut batch = WriteBatch::new();
        batch.put_record(&inst)?;
        self.commit(batch, |s| {
            s.instances.insert(inst.id, inst.clone());
        })?;
        Ok(inst)
    }

    fn save_character(&mut self, character: Character) -> TrackerResult<Character> {
        let mut batch = WriteBatch::new();
        batch.put_record(&character)?;
        self.commit(batch, |s| {
            s.characters.insert(character.id, character.clone());
        })?;
        Ok(character)
    }

    fn save_encounter(&mut self, enc: Encounter) -> TrackerResult<Encounter> {
        let mut batch = WriteBatch::new();
        batch.put_record(&enc)?;
        self.commit(batch, |s| {
            s.encounters.insert(enc.id, enc.clone());
        })?;
        Ok(enc)
    }

    fn modify_encounter<F>(&mut self, id: EncounterId, f: F) -> TrackerResult<Encounter>
    where
        F: FnOnce(&mut Encounter) -> MechResult<()>,
    {
        let mut enc = self.snapshot().require_encounter(id)?.clone();
        f(&mut enc)?;
        enc.touch();
        self.save_encounter(enc)
    }
}

/// A bound character's related character must exist in the same instance.
fn check_related(snap: &Snapshot, character: &Character) -> TrackerResult<()> {
    let Some(related) = character.kind.related_character() else {
        return Ok(());
    };
    if related == character.id {
        return Err(TrackerError::CrossReference(format!(
            "character {related} cannot be related to itself"
        )));
    }
    let other = snap.require_character(related)?;
    if other.instance_id != character.instance_id {
        return Err(TrackerError::CrossReference(format!(
            "related character {related} belongs to instance {}, not {}",
            other.instance_id, character.instance_id
        )));
    }
    Ok(())
}
