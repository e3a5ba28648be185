use clap::Subcommand;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color};

use tt_core::{CharacterId, EncounterId};
use tt_mechanics::Encounter;
use tt_tracker::{Snapshot, TrackerError, TrackerResult};

use super::{Session, or_dash, plural, table};

#[derive(Subcommand)]
pub enum EncounterAction {
    /// Create an empty encounter in an instance
    Create {
        /// Instance id or prefix
        instance: String,
        /// Encounter name
        name: String,
    },

    /// List the encounters in an instance
    List {
        /// Instance id or prefix
        instance: String,
    },

    /// Show the initiative roster
    Show {
        /// Encounter id or prefix
        id: String,
    },

    /// Rename an encounter
    Rename {
        /// Encounter id or prefix
        id: String,
        /// New name
        name: String,
    },

    /// Delete an encounter
    Delete {
        /// Encounter id or prefix
        id: String,
    },

    /// Seat a character at an initiative
    Join {
        /// Encounter id or prefix
        id: String,
        /// Character id or prefix
        character: String,
        /// Initiative score
        #[arg(allow_negative_numbers = true)]
        initiative: i32,
    },

    /// Remove a character from the roster
    Leave {
        /// Encounter id or prefix
        id: String,
        /// Character id or prefix
        character: String,
    },

    /// Change one participant's initiative
    Init {
        /// Encounter id or prefix
        id: String,
        /// Character id or prefix
        character: String,
        /// New initiative score
        #[arg(allow_negative_numbers = true)]
        initiative: i32,
    },

    /// Set many initiatives at once, as CHARACTER=SCORE pairs
    BulkInit {
        /// Encounter id or prefix
        id: String,
        /// Pairs like 3fa8=17
        #[arg(required = true)]
        entries: Vec<String>,
    },

    /// Advance to the next initiative slot
    Next {
        /// Encounter id or prefix
        id: String,
    },

    /// Return to round 0, keeping the roster
    Reset {
        /// Encounter id or prefix
        id: String,
    },

    /// Set or clear a participant's status label
    Status {
        /// Encounter id or prefix
        id: String,
        /// Character id or prefix
        character: String,
        /// Status text (omit to clear)
        status: Option<String>,
    },

    /// Apply or remove a condition on a participant
    Condition {
        /// Encounter id or prefix
        id: String,
        /// Character id or prefix
        character: String,
        /// Condition name
        condition: String,
        /// Remove instead of apply
        #[arg(long)]
        remove: bool,
    },
}

pub fn run(tracker: &mut Session, action: EncounterAction) -> TrackerResult<()> {
    match action {
        EncounterAction::Create { instance, name } => {
            let instance = tracker.snapshot().resolve_instance(&instance)?;
            let enc = tracker.create_encounter(instance, name)?;
            println!("  Created encounter {} [{}]", enc.name.bold(), enc.id);
            Ok(())
        }
        EncounterAction::List { instance } => {
            let snap = tracker.snapshot();
            let instance = snap.resolve_instance(&instance)?;
            let encounters = snap.encounters_in(instance);
            if encounters.is_empty() {
                println!("  No encounters found.");
                return Ok(());
            }

            let mut t = table(vec!["ID", "Name", "Round", "Initiative", "Participants"]);
            for e in &encounters {
                let init = if e.is_started() {
                    e.current_initiative.to_string()
                } else {
                    "—".to_string()
                };
                t.add_row(vec![
                    e.id.to_string(),
                    e.name.clone(),
                    e.round.to_string(),
                    init,
                    e.participant_count().to_string(),
                ]);
            }
            println!("{t}");
            println!();
            println!("  {}", plural(encounters.len(), "encounter"));
            Ok(())
        }
        EncounterAction::Show { id } => {
            let snap = tracker.snapshot();
            let enc = snap.require_encounter(snap.resolve_encounter(&id)?)?;
            print_roster(&snap, enc);
            Ok(())
        }
        EncounterAction::Rename { id, name } => {
            let id = tracker.snapshot().resolve_encounter(&id)?;
            let enc = tracker.rename_encounter(id, name)?;
            println!("  Renamed encounter to {} [{}]", enc.name.bold(), enc.id);
            Ok(())
        }
        EncounterAction::Delete { id } => {
            let id = tracker.snapshot().resolve_encounter(&id)?;
            let enc = tracker.delete_encounter(id)?;
            println!("  Deleted encounter {} [{}]", enc.name.bold(), enc.id);
            Ok(())
        }
        EncounterAction::Join {
            id,
            character,
            initiative,
        } => {
            let (id, character) = resolve_pair(tracker, &id, &character)?;
            let enc = tracker.add_participant(id, character, initiative)?;
            print_roster(&tracker.snapshot(), &enc);
            Ok(())
        }
        EncounterAction::Leave { id, character } => {
            let (id, character) = resolve_pair(tracker, &id, &character)?;
            let enc = tracker.remove_participant(id, character)?;
            print_roster(&tracker.snapshot(), &enc);
            Ok(())
        }
        EncounterAction::Init {
            id,
            character,
            initiative,
        } => {
            let (id, character) = resolve_pair(tracker, &id, &character)?;
            let enc = tracker.update_participant_initiative(id, character, initiative)?;
            print_roster(&tracker.snapshot(), &enc);
            Ok(())
        }
        EncounterAction::BulkInit { id, entries } => {
            let snap = tracker.snapshot();
            let id = snap.resolve_encounter(&id)?;
            let updates = entries
                .iter()
                .map(|entry| parse_entry(&snap, entry))
                .collect::<TrackerResult<Vec<_>>>()?;
            let enc = tracker.bulk_update_initiatives(id, &updates)?;
            print_roster(&tracker.snapshot(), &enc);
            Ok(())
        }
        EncounterAction::Next { id } => {
            let id = tracker.snapshot().resolve_encounter(&id)?;
            let enc = tracker.next_turn(id)?;
            let snap = tracker.snapshot();
            let acting: Vec<String> = snap
                .current_participants(id)?
                .into_iter()
                .map(|(_, c)| c.name.clone())
                .collect();
            println!(
                "  Round {}, initiative {}: {}",
                enc.round,
                enc.current_initiative,
                or_dash(Some(acting.join(", ").as_str())).bold()
            );
            Ok(())
        }
        EncounterAction::Reset { id } => {
            let id = tracker.snapshot().resolve_encounter(&id)?;
            let enc = tracker.reset_encounter(id)?;
            println!("  Reset encounter {} [{}]", enc.name.bold(), enc.id);
            Ok(())
        }
        EncounterAction::Status {
            id,
            character,
            status,
        } => {
            let (id, character) = resolve_pair(tracker, &id, &character)?;
            let enc = tracker.set_participant_status(id, character, status)?;
            print_roster(&tracker.snapshot(), &enc);
            Ok(())
        }
        EncounterAction::Condition {
            id,
            character,
            condition,
            remove,
        } => {
            let (id, character) = resolve_pair(tracker, &id, &character)?;
            let enc = if remove {
                tracker.remove_condition(id, character, &condition)?
            } else {
                tracker.add_condition(id, character, &condition)?
            };
            print_roster(&tracker.snapshot(), &enc);
            Ok(())
        }
    }
}

fn resolve_pair(
    tracker: &Session,
    encounter: &str,
    character: &str,
) -> TrackerResult<(EncounterId, CharacterId)> {
    let snap = tracker.snapshot();
    Ok((
        snap.resolve_encounter(encounter)?,
        snap.resolve_character(character)?,
    ))
}

/// Parse a `CHARACTER=SCORE` pair.
fn parse_entry(snap: &Snapshot, entry: &str) -> TrackerResult<(CharacterId, i32)> {
    let bad = || TrackerError::InvalidInput(format!("expected CHARACTER=SCORE, got \"{entry}\""));
    let (character, score) = entry.split_once('=').ok_or_else(bad)?;
    let score = score.trim().parse::<i32>().map_err(|_| bad())?;
    Ok((snap.resolve_character(character)?, score))
}

fn print_roster(snap: &Snapshot, enc: &Encounter) {
    let state = if enc.is_started() {
        format!("round {}, initiative {}", enc.round, enc.current_initiative)
    } else {
        "not started".to_string()
    };
    println!("  {} [{}] ({})", enc.name.bold(), enc.id, state.dimmed());

    if enc.participant_count() == 0 {
        println!("  No participants.");
        return;
    }

    let mut t = table(vec!["", "Init", "Name", "HP", "Status", "Conditions"]);
    for p in enc.participants() {
        let character = snap.character(p.character_id);
        let name = character.map_or_else(|| format!("(missing {})", p.character_id), |c| c.name.clone());
        // Encounter-scoped HP wins over the character sheet
        let hp = p.hp.or(character.map(|c| c.hp)).map(|hp| hp.to_string());
        let acting = enc.is_started() && p.initiative == enc.current_initiative;

        let cells = vec![
            Cell::new(if acting { "▶" } else { "" }),
            Cell::new(p.initiative),
            Cell::new(name),
            Cell::new(or_dash(hp.as_deref())),
            Cell::new(or_dash(p.status.as_deref())),
            Cell::new(or_dash(Some(p.conditions.to_string().as_str()))),
        ];
        if acting {
            t.add_row(
                cells
                    .into_iter()
                    .map(|c| c.fg(Color::Green).add_attribute(Attribute::Bold)),
            );
        } else {
            t.add_row(cells);
        }
    }
    println!("{t}");
}
