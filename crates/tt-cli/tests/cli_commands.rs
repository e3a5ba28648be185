//! Integration tests for the tt CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A temp directory plus the data file the commands share.
fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("tt.json");
    (dir, data)
}

fn tt(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tt").unwrap();
    cmd.env("TT_DATA", data)
        .env("NO_COLOR", "1")
        .env_remove("TT_CONFIG")
        .env_remove("TT_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a creating command and return the short id it prints in brackets.
fn created_id(data: &Path, args: &[&str]) -> String {
    let assert = tt(data).args(args).assert().success();
    let text = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let start = text.rfind('[').unwrap() + 1;
    let end = text.rfind(']').unwrap();
    text[start..end].to_string()
}

/// An instance with one NPC; returns (instance id, character id).
fn instance_with_npc(data: &Path) -> (String, String) {
    let inst = created_id(data, &["instance", "create", "Kingmaker", "--system", "PF2e"]);
    let npc = created_id(
        data,
        &["character", "add", &inst, "Tartuccio", "--hp", "10", "--ac", "16"],
    );
    (inst, npc)
}

// ---------------------------------------------------------------------------
// instance
// ---------------------------------------------------------------------------

#[test]
fn instance_create_and_list() {
    let (_dir, data) = workspace();
    tt(&data)
        .args(["instance", "create", "Kingmaker", "-t", "Sandbox", "-t", "pathfinder"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created instance"));

    tt(&data)
        .args(["instance", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Kingmaker")
                .and(predicate::str::contains("pathfinder, sandbox"))
                .and(predicate::str::contains("1 instance")),
        );
    assert!(data.exists());
}

#[test]
fn instance_list_filters() {
    let (_dir, data) = workspace();
    let strahd = created_id(&data, &["instance", "create", "Curse of Strahd", "-t", "horror"]);
    created_id(&data, &["instance", "create", "Kingmaker", "-t", "sandbox"]);
    tt(&data)
        .args(["instance", "status", &strahd, "archived"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now archived"));

    tt(&data)
        .args(["instance", "list", "--status", "active"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Kingmaker")
                .and(predicate::str::contains("Strahd").not()),
        );

    tt(&data)
        .args(["instance", "list", "--tag", "HORROR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Curse of Strahd"));

    tt(&data)
        .args(["instance", "list", "--tag", "scifi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No instances found"));
}

#[test]
fn instance_group_by_tag_and_tags() {
    let (_dir, data) = workspace();
    created_id(&data, &["instance", "create", "A", "-t", "dungeon", "-t", "pf2e"]);
    created_id(&data, &["instance", "create", "B", "-t", "pf2e"]);

    tt(&data)
        .args(["instance", "list", "--group-by", "tag"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dungeon (1)").and(predicate::str::contains("pf2e (2)")));

    tt(&data)
        .args(["instance", "tags"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pf2e (2)"));
}

#[test]
fn instance_update_tags_and_notes() {
    let (_dir, data) = workspace();
    let inst = created_id(&data, &["instance", "create", "Kingmaker", "-t", "sandbox"]);
    tt(&data)
        .args([
            "instance", "update", &inst, "--add-tag", "Hexcrawl", "--remove-tag", "sandbox",
            "--notes", "Session 12 next",
        ])
        .assert()
        .success();

    tt(&data)
        .args(["instance", "show", &inst])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("hexcrawl")
                .and(predicate::str::contains("sandbox").not())
                .and(predicate::str::contains("Session 12 next")),
        );
}

#[test]
fn unknown_id_is_reported() {
    let (_dir, data) = workspace();
    tt(&data)
        .args(["instance", "show", "ffffffff"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: instance not found"));
}

// ---------------------------------------------------------------------------
// character
// ---------------------------------------------------------------------------

#[test]
fn pc_requires_player() {
    let (_dir, data) = workspace();
    let inst = created_id(&data, &["instance", "create", "Kingmaker"]);
    tt(&data)
        .args(["character", "add", &inst, "Amiri", "--type", "pc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("player identifier"));

    tt(&data)
        .args(["character", "add", &inst, "Amiri", "--type", "pc", "--player", "sam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added PC Amiri"));
}

#[test]
fn familiar_needs_related_character() {
    let (_dir, data) = workspace();
    let (inst, npc) = instance_with_npc(&data);
    tt(&data)
        .args(["character", "add", &inst, "Pip", "--type", "familiar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("related character"));

    tt(&data)
        .args(["character", "add", &inst, "Pip", "--type", "familiar", "--related", &npc])
        .assert()
        .success();

    tt(&data)
        .args(["character", "list", &inst])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pip").and(predicate::str::contains("2 characters")));
}

#[test]
fn damage_consumes_temp_hp_first() {
    let (_dir, data) = workspace();
    let inst = created_id(&data, &["instance", "create", "Kingmaker"]);
    let c = created_id(
        &data,
        &["character", "add", &inst, "Bandit", "--hp", "10", "--temp", "5"],
    );

    tt(&data)
        .args(["character", "damage", &c, "8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7/10"));

    tt(&data)
        .args(["character", "heal", &c, "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10/10").and(predicate::str::contains("(+").not()));

    tt(&data)
        .args(["character", "max-hp", &c, "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("6/6"));
}

#[test]
fn armor_class_can_go_negative() {
    let (_dir, data) = workspace();
    let (_inst, npc) = instance_with_npc(&data);
    tt(&data)
        .args(["character", "ac-mod", &npc, "-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AC -4"));
    tt(&data)
        .args(["character", "ac", &npc, "18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AC 18"));
}

// ---------------------------------------------------------------------------
// encounter
// ---------------------------------------------------------------------------

#[test]
fn initiative_cycles_through_rounds() {
    let (_dir, data) = workspace();
    let inst = created_id(&data, &["instance", "create", "Kingmaker"]);
    let enc = created_id(&data, &["encounter", "create", &inst, "Stag Lord's fort"]);
    for (name, init) in [("Akiros", "20"), ("Dovan", "15"), ("Happs", "15"), ("Kressle", "5")] {
        let c = created_id(&data, &["character", "add", &inst, name]);
        tt(&data)
            .args(["encounter", "join", &enc, &c, init])
            .assert()
            .success();
    }

    let expected = [
        "Round 1, initiative 20: Akiros",
        "Round 1, initiative 15: Dovan, Happs",
        "Round 1, initiative 5: Kressle",
        "Round 2, initiative 20: Akiros",
    ];
    for line in expected {
        tt(&data)
            .args(["encounter", "next", &enc])
            .assert()
            .success()
            .stdout(predicate::str::contains(line));
    }

    tt(&data)
        .args(["encounter", "show", &enc])
        .assert()
        .success()
        .stdout(predicate::str::contains("round 2, initiative 20"));

    tt(&data)
        .args(["encounter", "reset", &enc])
        .assert()
        .success();
    tt(&data)
        .args(["encounter", "show", &enc])
        .assert()
        .success()
        .stdout(predicate::str::contains("not started"));
}

#[test]
fn next_on_empty_encounter_fails() {
    let (_dir, data) = workspace();
    let inst = created_id(&data, &["instance", "create", "Kingmaker"]);
    let enc = created_id(&data, &["encounter", "create", &inst, "Empty room"]);
    tt(&data)
        .args(["encounter", "next", &enc])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no participants"));
}

#[test]
fn join_rejects_other_instance() {
    let (_dir, data) = workspace();
    let (_inst, npc) = instance_with_npc(&data);
    let other = created_id(&data, &["instance", "create", "Other"]);
    let enc = created_id(&data, &["encounter", "create", &other, "Fight"]);
    tt(&data)
        .args(["encounter", "join", &enc, &npc, "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cross-reference"));
}

#[test]
fn bulk_init_and_conditions() {
    let (_dir, data) = workspace();
    let (inst, npc) = instance_with_npc(&data);
    let other = created_id(&data, &["character", "add", &inst, "Owlbear"]);
    let enc = created_id(&data, &["encounter", "create", &inst, "Fight"]);
    tt(&data).args(["encounter", "join", &enc, &npc, "1"]).assert().success();
    tt(&data).args(["encounter", "join", &enc, &other, "2"]).assert().success();

    let npc_entry = format!("{npc}=18");
    let other_entry = format!("{other}=-3");
    tt(&data)
        .args(["encounter", "bulk-init", &enc, &npc_entry, &other_entry])
        .assert()
        .success()
        .stdout(predicate::str::contains("18").and(predicate::str::contains("-3")));

    tt(&data)
        .args(["encounter", "condition", &enc, &other, "Frightened"])
        .assert()
        .success()
        .stdout(predicate::str::contains("frightened"));

    tt(&data)
        .args(["encounter", "bulk-init", &enc, "nonsense"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CHARACTER=SCORE"));
}

// ---------------------------------------------------------------------------
// cascade and sweep
// ---------------------------------------------------------------------------

#[test]
fn delete_instance_cascades() {
    let (_dir, data) = workspace();
    let (inst, _npc) = instance_with_npc(&data);
    created_id(&data, &["encounter", "create", &inst, "Fight"]);

    tt(&data)
        .args(["instance", "delete", &inst])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 character, 1 encounter"));

    let raw = fs::read_to_string(&data).unwrap();
    assert!(!raw.contains("Tartuccio"));
    assert!(!raw.contains("Fight"));
}

#[test]
fn characters_only_cascade_then_sweep() {
    let (dir, data) = workspace();
    let config = dir.path().join("tt-config.json");
    fs::write(&config, r#"{ "cascade": "characters-only" }"#).unwrap();

    let (inst, _npc) = instance_with_npc(&data);
    created_id(&data, &["encounter", "create", &inst, "Fight"]);

    tt(&data)
        .args(["--config", config.to_str().unwrap(), "instance", "delete", &inst])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 character, 0 encounters"));

    tt(&data)
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 orphaned encounter"));

    tt(&data)
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("No orphaned records"));
}

#[test]
fn bad_cascade_flag_fails() {
    let (_dir, data) = workspace();
    tt(&data)
        .args(["--cascade", "everything", "sweep"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("invalid value 'everything'")
                .and(predicate::str::contains("characters-only")),
        );
}

#[test]
fn cascade_flag_accepts_alias() {
    let (_dir, data) = workspace();
    let (inst, _npc) = instance_with_npc(&data);
    created_id(&data, &["encounter", "create", &inst, "Fight"]);

    tt(&data)
        .args(["--cascade", "characters", "instance", "delete", &inst])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 character, 0 encounters"));
}
