use clap::{Subcommand, ValueEnum};
use colored::Colorize;

use tt_core::{GameInstance, InstancePatch, InstanceStatus, TagSet};
use tt_tracker::TrackerResult;

use super::{Session, or_dash, plural, table};

#[derive(Subcommand)]
pub enum InstanceAction {
    /// Create a new active instance
    Create {
        /// Instance name
        name: String,

        /// Game system label (e.g. "PF2e")
        #[arg(long)]
        system: Option<String>,

        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List instances, most recently accessed first
    List {
        /// Only instances with this status
        #[arg(long)]
        status: Option<InstanceStatus>,

        /// Only instances carrying this tag (repeatable, all must match)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Only instances whose name contains this text
        #[arg(long)]
        name: Option<String>,

        /// Group the listing
        #[arg(long)]
        group_by: Option<Grouping>,

        /// Show at most this many
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show an instance with its characters and encounters
    Show {
        /// Instance id or prefix
        id: String,
    },

    /// Change instance fields
    Update {
        /// Instance id or prefix
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New system label (empty string clears it)
        #[arg(long)]
        system: Option<String>,

        /// New notes (empty string clears them)
        #[arg(long)]
        notes: Option<String>,

        /// Tag to add (repeatable)
        #[arg(long = "add-tag")]
        add_tags: Vec<String>,

        /// Tag to remove (repeatable)
        #[arg(long = "remove-tag")]
        remove_tags: Vec<String>,
    },

    /// Set the status label (active, paused, completed, archived)
    Status {
        /// Instance id or prefix
        id: String,

        /// New status
        status: InstanceStatus,
    },

    /// Delete an instance and what it owns
    Delete {
        /// Instance id or prefix
        id: String,
    },

    /// List every tag in use
    Tags,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Grouping {
    Status,
    Tag,
}

pub fn run(tracker: &mut Session, action: InstanceAction) -> TrackerResult<()> {
    match action {
        InstanceAction::Create {
            name,
            system,
            tags,
            notes,
        } => {
            let inst = tracker.create_instance(name, system, TagSet::from_iter(tags))?;
            let inst = match notes {
                Some(notes) => tracker.update_instance(
                    inst.id,
                    InstancePatch {
                        notes: Some(Some(notes)),
                        ..Default::default()
                    },
                )?,
                None => inst,
            };
            println!("  Created instance {} [{}]", inst.name.bold(), inst.id);
            Ok(())
        }
        InstanceAction::List {
            status,
            tags,
            name,
            group_by,
            limit,
        } => {
            let snap = tracker.snapshot();
            if let Some(grouping) = group_by {
                match grouping {
                    Grouping::Status => {
                        for (status, group) in snap.instances_grouped_by_status() {
                            print_group(&status.to_string(), &group);
                        }
                    }
                    Grouping::Tag => {
                        for (tag, group) in snap.instances_grouped_by_tag() {
                            print_group(&tag, &group);
                        }
                    }
                }
                return Ok(());
            }

            let mut query = snap.query();
            if let Some(status) = status {
                query = query.status(status);
            }
            for tag in &tags {
                query = query.tag(tag);
            }
            if let Some(name) = name {
                query = query.name_contains(name);
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            let results = query.execute();

            if results.is_empty() {
                println!("  No instances found.");
                return Ok(());
            }

            let mut t = table(vec!["ID", "Name", "System", "Status", "Tags", "Last accessed"]);
            for inst in &results {
                t.add_row(vec![
                    inst.id.to_string(),
                    inst.name.clone(),
                    or_dash(inst.system.as_deref()),
                    inst.status.to_string(),
                    or_dash(Some(inst.tags.to_string().as_str())),
                    inst.last_accessed.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }
            println!("{t}");
            println!();
            println!("  {}", plural(results.len(), "instance"));
            Ok(())
        }
        InstanceAction::Show { id } => {
            let id = tracker.snapshot().resolve_instance(&id)?;
            let inst = tracker.touch_instance(id)?;
            let snap = tracker.snapshot();

            println!("  {} [{}]", inst.name.bold(), inst.status.to_string().dimmed());
            println!();
            println!("  id:       {}", inst.id.as_uuid());
            println!("  system:   {}", or_dash(inst.system.as_deref()));
            println!("  tags:     {}", or_dash(Some(inst.tags.to_string().as_str())));
            println!("  created:  {}", inst.created_at.format("%Y-%m-%d %H:%M"));
            if let Some(notes) = &inst.notes {
                println!();
                for line in notes.lines() {
                    println!("  {}", line.trim());
                }
            }

            let characters = snap.characters_in(id);
            if !characters.is_empty() {
                println!();
                println!("  {}", "Characters".bold());
                let mut t = table(vec!["ID", "Name", "Type", "HP", "AC"]);
                for c in characters {
                    t.add_row(vec![
                        c.id.to_string(),
                        c.name.clone(),
                        c.character_type().to_string(),
                        c.hp.to_string(),
                        c.ac.to_string(),
                    ]);
                }
                println!("{t}");
            }

            let encounters = snap.encounters_in(id);
            if !encounters.is_empty() {
                println!();
                println!("  {}", "Encounters".bold());
                let mut t = table(vec!["ID", "Name", "Round", "Participants"]);
                for e in encounters {
                    t.add_row(vec![
                        e.id.to_string(),
                        e.name.clone(),
                        e.round.to_string(),
                        e.participant_count().to_string(),
                    ]);
                }
                println!("{t}");
            }
            Ok(())
        }
        InstanceAction::Update {
            id,
            name,
            system,
            notes,
            add_tags,
            remove_tags,
        } => {
            let snap = tracker.snapshot();
            let id = snap.resolve_instance(&id)?;
            let tags = if add_tags.is_empty() && remove_tags.is_empty() {
                None
            } else {
                let mut tags = snap.require_instance(id)?.tags.clone();
                for tag in &add_tags {
                    tags.insert(tag);
                }
                for tag in &remove_tags {
                    tags.remove(tag);
                }
                Some(tags)
            };
            let patch = InstancePatch {
                name,
                system: system.map(|s| Some(s).filter(|s| !s.trim().is_empty())),
                status: None,
                tags,
                notes: notes.map(|n| Some(n).filter(|n| !n.trim().is_empty())),
            };
            let inst = tracker.update_instance(id, patch)?;
            println!("  Updated instance {} [{}]", inst.name.bold(), inst.id);
            Ok(())
        }
        InstanceAction::Status { id, status } => {
            let id = tracker.snapshot().resolve_instance(&id)?;
            let inst = tracker.set_instance_status(id, status)?;
            println!("  {} is now {}", inst.name.bold(), inst.status);
            Ok(())
        }
        InstanceAction::Delete { id } => {
            let snap = tracker.snapshot();
            let id = snap.resolve_instance(&id)?;
            let name = snap.require_instance(id)?.name.clone();
            let report = tracker.delete_instance(id)?;
            println!(
                "  Deleted instance {} ({}, {})",
                name.bold(),
                plural(report.characters.len(), "character"),
                plural(report.encounters.len(), "encounter"),
            );
            Ok(())
        }
        InstanceAction::Tags => {
            let snap = tracker.snapshot();
            let groups = snap.instances_grouped_by_tag();
            if groups.is_empty() {
                println!("  No tags in use.");
                return Ok(());
            }
            for tag in snap.all_tags() {
                let count = groups.get(&tag).map_or(0, Vec::len);
                println!("  {tag} ({count})");
            }
            Ok(())
        }
    }
}

fn print_group(label: &str, group: &[&GameInstance]) {
    println!("  {} ({})", label.bold(), group.len());
    for inst in group {
        println!("    {} [{}]", inst.name, inst.id);
    }
}
