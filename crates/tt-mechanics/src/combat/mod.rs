//! Encounter roster and initiative turn engine.
//!
//! The roster is kept sorted by initiative, highest first, with ties in
//! insertion order. `current_initiative` names the initiative slot whose
//! holders are acting; everyone sharing that value acts together. A value
//! of 0 with `round == 0` means the encounter has not started.

pub mod participant;

pub use participant::Participant;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tt_core::{Character, CharacterId, EncounterId, HitPoints, InstanceId};

use crate::error::{MechError, MechResult};

/// A combat encounter within a game instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    /// Unique identifier.
    pub id: EncounterId,
    /// The instance that owns this encounter.
    pub instance_id: InstanceId,
    /// Display name.
    pub name: String,
    /// Current round (0 before the first turn).
    pub round: u32,
    /// Initiative value whose holders are acting now.
    pub current_initiative: i32,
    participants: Vec<Participant>,
    /// When the encounter was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Encounter {
    /// Create an empty, unstarted encounter.
    pub fn new(instance_id: InstanceId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: EncounterId::new(),
            instance_id,
            name: name.into(),
            round: 0,
            current_initiative: 0,
            participants: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The roster, sorted by initiative descending.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant by character.
    pub fn participant(&self, character_id: CharacterId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.character_id == character_id)
    }

    /// Number of participants.
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Returns true once the first turn has been taken.
    pub fn is_started(&self) -> bool {
        self.round > 0
    }

    /// Stamp the update time.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Distinct initiative values, highest first.
    pub fn distinct_initiatives(&self) -> Vec<i32> {
        let mut values: Vec<i32> = self.participants.iter().map(|p| p.initiative).collect();
        // Already sorted descending, so duplicates are adjacent
        values.dedup();
        values
    }

    /// Participants acting in the current initiative slot. Empty until the
    /// first turn.
    pub fn current_participants(&self) -> Vec<&Participant> {
        if !self.is_started() {
            return Vec::new();
        }
        self.participants
            .iter()
            .filter(|p| p.initiative == self.current_initiative)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Seat a character. It must belong to this encounter's instance and
    /// must not already be seated. Round and current initiative are unchanged.
    pub fn add_participant(&mut self, character: &Character, initiative: i32) -> MechResult<()> {
        if character.instance_id != self.instance_id {
            return Err(MechError::CrossInstanceParticipant {
                character: character.id,
                character_instance: character.instance_id,
                encounter_instance: self.instance_id,
            });
        }
        if self.participant(character.id).is_some() {
            return Err(MechError::AlreadyParticipating(character.id));
        }
        self.participants
            .push(Participant::new(character.id, initiative));
        self.sort_roster();
        Ok(())
    }

    /// Remove a participant. If it was the last holder of the current
    /// initiative, the turn moves to the highest remaining initiative, or
    /// to 0 when the roster is now empty. An unstarted encounter keeps
    /// its turn state.
    pub fn remove_participant(&mut self, character_id: CharacterId) -> MechResult<Participant> {
        let pos = self.position(character_id)?;
        let removed = self.participants.remove(pos);
        if self.is_started()
            && removed.initiative == self.current_initiative
            && !self.holds_initiative(removed.initiative)
        {
            self.current_initiative = self
                .participants
                .first()
                .map(|p| p.initiative)
                .unwrap_or(0);
        }
        Ok(removed)
    }

    /// Change one participant's initiative and re-sort.
    ///
    /// If the participant's old value was the active slot and nobody else
    /// holds it any more, the turn moves to the next lower distinct value,
    /// or to the lowest value if there is none. This is a local repair and
    /// never starts a new round; an unstarted encounter is left alone.
    pub fn update_participant_initiative(
        &mut self,
        character_id: CharacterId,
        initiative: i32,
    ) -> MechResult<()> {
        let pos = self.position(character_id)?;
        let old = self.participants[pos].initiative;
        self.participants[pos].initiative = initiative;
        self.sort_roster();

        if self.is_started() && old == self.current_initiative && !self.holds_initiative(old) {
            let distinct = self.distinct_initiatives();
            self.current_initiative = distinct
                .iter()
                .copied()
                .find(|&v| v < old)
                .or_else(|| distinct.last().copied())
                .unwrap_or(0);
        }
        Ok(())
    }

    /// Apply many initiative changes and re-sort once. Characters not on
    /// the roster are ignored; when a character appears more than once the
    /// last value wins. No turn repair is performed. Returns how many
    /// participants were updated.
    pub fn bulk_update_initiatives<I>(&mut self, updates: I) -> usize
    where
        I: IntoIterator<Item = (CharacterId, i32)>,
    {
        let updates: HashMap<CharacterId, i32> = updates.into_iter().collect();
        let mut changed = 0;
        for p in &mut self.participants {
            if let Some(&initiative) = updates.get(&p.character_id) {
                p.initiative = initiative;
                changed += 1;
            }
        }
        self.sort_roster();
        changed
    }

    // -----------------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------------

    /// Advance to the next initiative slot. Returns true if a new round
    /// started.
    ///
    /// Turns cycle through distinct initiative values, highest first. A new
    /// round begins when the current value is the lowest, is no longer held
    /// by anyone, or the encounter has not started yet.
    pub fn next_turn(&mut self) -> MechResult<bool> {
        let distinct = self.distinct_initiatives();
        let highest = *distinct.first().ok_or(MechError::EmptyRoster)?;

        let next = if self.is_started() {
            distinct
                .iter()
                .position(|&v| v == self.current_initiative)
                .and_then(|i| distinct.get(i + 1))
                .copied()
        } else {
            None
        };

        match next {
            Some(value) => {
                self.current_initiative = value;
                Ok(false)
            }
            None => {
                self.round += 1;
                self.current_initiative = highest;
                Ok(true)
            }
        }
    }

    /// Put the encounter back to its unstarted state, keeping the roster.
    pub fn reset(&mut self) {
        self.round = 0;
        self.current_initiative = 0;
    }

    // -----------------------------------------------------------------------
    // Per-participant combat notes
    // -----------------------------------------------------------------------

    /// Set or clear a participant's status label.
    pub fn set_participant_status(
        &mut self,
        character_id: CharacterId,
        status: Option<String>,
    ) -> MechResult<()> {
        let pos = self.position(character_id)?;
        self.participants[pos].status = status.filter(|s| !s.trim().is_empty());
        Ok(())
    }

    /// Set or clear a participant's encounter-scoped hit points.
    pub fn set_participant_hp(
        &mut self,
        character_id: CharacterId,
        hp: Option<HitPoints>,
    ) -> MechResult<()> {
        let pos = self.position(character_id)?;
        self.participants[pos].hp = hp;
        Ok(())
    }

    /// Apply a condition. Returns true if it was not already applied.
    pub fn add_condition(&mut self, character_id: CharacterId, condition: &str) -> MechResult<bool> {
        let pos = self.position(character_id)?;
        Ok(self.participants[pos].conditions.insert(condition))
    }

    /// Remove a condition. Returns true if it was applied.
    pub fn remove_condition(
        &mut self,
        character_id: CharacterId,
        condition: &str,
    ) -> MechResult<bool> {
        let pos = self.position(character_id)?;
        Ok(self.participants[pos].conditions.remove(condition))
    }

    fn position(&self, character_id: CharacterId) -> MechResult<usize> {
        self.participants
            .iter()
            .position(|p| p.character_id == character_id)
            .ok_or(MechError::ParticipantNotFound(character_id))
    }

    fn holds_initiative(&self, initiative: i32) -> bool {
        self.participants.iter().any(|p| p.initiative == initiative)
    }

    /// Sort by initiative (descending). `sort_by` is stable, so ties keep
    /// their existing relative order.
    fn sort_roster(&mut self) {
        self.participants
            .sort_by(|a, b| b.initiative.cmp(&a.initiative));
    }
}
