use clap::Subcommand;
use colored::Colorize;

use tt_core::{Character, CharacterDraft, CharacterPatch, CharacterType, HitPoints};
use tt_tracker::TrackerResult;

use super::{Session, or_dash, plural, table};

#[derive(Subcommand)]
pub enum CharacterAction {
    /// Add a character to an instance
    Add {
        /// Instance id or prefix
        instance: String,

        /// Character name
        name: String,

        /// pc, npc, hazard, familiar, eidolon, or companion
        #[arg(long = "type", default_value = "npc")]
        kind: CharacterType,

        /// Maximum (and starting) hit points
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        hp: i32,

        /// Armor class
        #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
        ac: i32,

        /// Temporary hit points
        #[arg(long)]
        temp: Option<i32>,

        /// Player identifier (required for pc)
        #[arg(long)]
        player: Option<String>,

        /// Id or prefix of the bound character (familiar, eidolon, companion)
        #[arg(long)]
        related: Option<String>,
    },

    /// List the characters in an instance
    List {
        /// Instance id or prefix
        instance: String,
    },

    /// Show a character
    Show {
        /// Character id or prefix
        id: String,
    },

    /// Change character fields; the result is re-validated
    Update {
        /// Character id or prefix
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New type
        #[arg(long = "type")]
        kind: Option<CharacterType>,

        /// New player identifier (empty string clears it)
        #[arg(long)]
        player: Option<String>,

        /// New related character id or prefix (empty string clears it)
        #[arg(long)]
        related: Option<String>,
    },

    /// Delete a character; encounter rosters keep their entry
    Delete {
        /// Character id or prefix
        id: String,
    },

    /// Deal damage (temporary HP absorbs it first)
    Damage {
        /// Character id or prefix
        id: String,
        /// Damage amount
        amount: i32,
    },

    /// Heal up to maximum HP
    Heal {
        /// Character id or prefix
        id: String,
        /// Amount healed
        amount: i32,
    },

    /// Set temporary hit points
    Temp {
        /// Character id or prefix
        id: String,
        /// New temporary HP
        value: i32,
    },

    /// Set maximum hit points
    MaxHp {
        /// Character id or prefix
        id: String,
        /// New maximum HP
        value: i32,
    },

    /// Set current hit points
    Hp {
        /// Character id or prefix
        id: String,
        /// New current HP
        value: i32,
    },

    /// Set armor class
    Ac {
        /// Character id or prefix
        id: String,
        /// New armor class
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },

    /// Adjust armor class by a signed amount
    AcMod {
        /// Character id or prefix
        id: String,
        /// Change to apply, e.g. -2
        #[arg(allow_negative_numbers = true)]
        delta: i32,
    },
}

pub fn run(tracker: &mut Session, action: CharacterAction) -> TrackerResult<()> {
    match action {
        CharacterAction::Add {
            instance,
            name,
            kind,
            hp,
            ac,
            temp,
            player,
            related,
        } => {
            let snap = tracker.snapshot();
            let instance = snap.resolve_instance(&instance)?;
            let mut draft = CharacterDraft::new(name, kind, hp, ac).with_hp(HitPoints {
                temp,
                ..HitPoints::full(hp)
            });
            if let Some(player) = player {
                draft = draft.with_player(player);
            }
            if let Some(related) = related {
                draft = draft.with_related(snap.resolve_character(&related)?);
            }
            let c = tracker.create_character(instance, draft)?;
            println!(
                "  Added {} {} [{}]",
                c.character_type(),
                c.name.bold(),
                c.id
            );
            Ok(())
        }
        CharacterAction::List { instance } => {
            let snap = tracker.snapshot();
            let instance = snap.resolve_instance(&instance)?;
            let characters = snap.characters_in(instance);
            if characters.is_empty() {
                println!("  No characters found.");
                return Ok(());
            }

            let mut t = table(vec!["ID", "Name", "Type", "HP", "AC", "Player / Bound to"]);
            for c in &characters {
                let link = match c.kind.related_character() {
                    Some(related) => snap
                        .character(related)
                        .map_or_else(|| related.to_string(), |r| r.name.clone()),
                    None => or_dash(c.kind.player_id()),
                };
                t.add_row(vec![
                    c.id.to_string(),
                    c.name.clone(),
                    c.character_type().to_string(),
                    c.hp.to_string(),
                    c.ac.to_string(),
                    link,
                ]);
            }
            println!("{t}");
            println!();
            println!("  {}", plural(characters.len(), "character"));
            Ok(())
        }
        CharacterAction::Show { id } => {
            let snap = tracker.snapshot();
            let c = snap.require_character(snap.resolve_character(&id)?)?;
            print_character(c);
            if let Some(related) = c.kind.related_character() {
                let name = snap
                    .character(related)
                    .map_or_else(|| "(deleted)".to_string(), |r| r.name.clone());
                println!("  bound to: {name} [{related}]");
            }
            Ok(())
        }
        CharacterAction::Update {
            id,
            name,
            kind,
            player,
            related,
        } => {
            let snap = tracker.snapshot();
            let id = snap.resolve_character(&id)?;
            let related = match related {
                Some(r) if r.trim().is_empty() => Some(None),
                Some(r) => Some(Some(snap.resolve_character(&r)?)),
                None => None,
            };
            let patch = CharacterPatch {
                name,
                character_type: kind,
                related_character_id: related,
                player_id: player.map(|p| Some(p).filter(|p| !p.trim().is_empty())),
                hp: None,
                ac: None,
            };
            let c = tracker.update_character(id, patch)?;
            println!("  Updated {} [{}]", c.name.bold(), c.id);
            Ok(())
        }
        CharacterAction::Delete { id } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            let c = tracker.delete_character(id)?;
            println!("  Deleted {} [{}]", c.name.bold(), c.id);
            Ok(())
        }
        CharacterAction::Damage { id, amount } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            report_hp(&tracker.damage(id, amount)?);
            Ok(())
        }
        CharacterAction::Heal { id, amount } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            report_hp(&tracker.heal(id, amount)?);
            Ok(())
        }
        CharacterAction::Temp { id, value } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            report_hp(&tracker.set_temp_hp(id, value)?);
            Ok(())
        }
        CharacterAction::MaxHp { id, value } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            report_hp(&tracker.set_max_hp(id, value)?);
            Ok(())
        }
        CharacterAction::Hp { id, value } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            report_hp(&tracker.set_current_hp(id, value)?);
            Ok(())
        }
        CharacterAction::Ac { id, value } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            let c = tracker.set_ac(id, value)?;
            println!("  {} AC {}", c.name.bold(), c.ac);
            Ok(())
        }
        CharacterAction::AcMod { id, delta } => {
            let id = tracker.snapshot().resolve_character(&id)?;
            let c = tracker.modify_ac(id, delta)?;
            println!("  {} AC {}", c.name.bold(), c.ac);
            Ok(())
        }
    }
}

fn print_character(c: &Character) {
    println!("  {} [{}]", c.name.bold(), c.character_type().to_string().dimmed());
    println!();
    println!("  id:       {}", c.id.as_uuid());
    println!("  instance: {}", c.instance_id);
    println!("  HP:       {}", hp_colored(&c.hp));
    println!("  AC:       {}", c.ac);
    if let Some(player) = c.kind.player_id() {
        println!("  player:   {player}");
    }
    println!("  updated:  {}", c.updated_at.format("%Y-%m-%d %H:%M"));
}

fn report_hp(c: &Character) {
    println!("  {} HP {}", c.name.bold(), hp_colored(&c.hp));
}

fn hp_colored(hp: &HitPoints) -> String {
    let text = hp.to_string();
    if hp.current <= 0 {
        text.red().bold().to_string()
    } else if hp.current <= hp.max / 2 {
        text.yellow().to_string()
    } else {
        text.green().to_string()
    }
}
