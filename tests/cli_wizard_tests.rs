mod common;

use std::fs;

use assert_cmd::Command;
use common::CliHarness;
use predicates::prelude::*;
use regex::Regex;

#[test]
fn version_prints_build_summary() {
    let harness = CliHarness::new();
    let out = harness.run(&["version"], &[], &[]);
    assert_eq!(out.status, 0);
    let pattern = Regex::new(r"^habit_core \d+\.\d+\.\d+ \(").expect("regex");
    assert!(pattern.is_match(out.stdout.trim()), "stdout: {}", out.stdout);
}

#[test]
fn unknown_command_suggests_the_closest_one() {
    let home = tempfile::tempdir().expect("temp dir");
    Command::cargo_bin("habit_core_cli")
        .expect("binary exists")
        .env("HABIT_CORE_HOME", home.path())
        .env_remove("RUST_LOG")
        .arg("lst")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown command `lst`."))
        .stderr(predicate::str::contains("Did you mean `list`?"));
}

#[test]
fn help_lists_every_command() {
    let harness = CliHarness::new();
    let out = harness.run(&["help"], &[], &[]);
    assert_eq!(out.status, 0);
    for command in ["add", "edit <id>", "list", "validate", "version"] {
        assert!(out.stdout.contains(command), "missing {command}: {}", out.stdout);
    }
}

#[test]
fn list_on_a_fresh_home_is_empty() {
    let harness = CliHarness::new();
    let out = harness.run(&["list"], &[], &[]);
    assert_eq!(out.status, 0);
    assert!(out.stdout.contains("No habits yet."));
    assert!(!harness.schema_path().exists());
}

#[test]
fn add_simple_habit_saves_the_schema() {
    let harness = CliHarness::new();
    let out = harness.run(
        &["add", "simple"],
        &["Drink water", "<BLANK>", "<BLANK>"],
        &["ENTER", "ENTER"],
    );
    assert_eq!(out.status, 0, "stderr: {}", out.stderr);
    assert!(out
        .stdout
        .contains("OK: Saved habit `Drink water` (drink_water)."));

    let raw = fs::read_to_string(harness.schema_path()).expect("schema written");
    assert!(raw.contains("\"id\": \"drink_water\""));
    assert!(raw.contains("\"scoring_type\": \"manual\""));

    let listed = harness.run(&["list"], &[], &[]);
    let row = Regex::new(r"(?m)^drink_water\s+Simple\s+Drink water$").expect("regex");
    assert!(row.is_match(&listed.stdout), "stdout: {}", listed.stdout);

    let validated = harness.run(&["validate"], &[], &[]);
    assert_eq!(validated.status, 0);
    assert!(validated.stdout.contains("is valid (1 habits)."));
}

#[test]
fn add_twice_with_the_same_title_numbers_the_id() {
    let harness = CliHarness::new();
    for _ in 0..2 {
        let out = harness.run(
            &["add", "simple"],
            &["Read", "<BLANK>", "<BLANK>"],
            &["ENTER", "ENTER"],
        );
        assert_eq!(out.status, 0, "stderr: {}", out.stderr);
    }
    let raw = fs::read_to_string(harness.schema_path()).expect("schema written");
    assert!(raw.contains("\"id\": \"read\""));
    assert!(raw.contains("\"id\": \"read_2\""));
}

#[test]
fn cancelling_leaves_nothing_behind() {
    let harness = CliHarness::new();
    let out = harness.run(&["add", "elastic"], &["<CANCEL>"], &[]);
    assert_eq!(out.status, 0);
    assert!(out.stdout.contains("Habit creation cancelled."));
    assert!(!harness.schema_path().exists());
}

#[test]
fn escape_on_the_kind_menu_cancels() {
    let harness = CliHarness::new();
    let out = harness.run(&["add"], &[], &["ESC"]);
    assert_eq!(out.status, 0);
    assert!(out.stdout.contains("Habit creation cancelled."));
}

#[test]
fn edit_of_an_unknown_id_fails() {
    let harness = CliHarness::new();
    let out = harness.run(&["edit", "ghost"], &[], &[]);
    assert_eq!(out.status, 1);
    assert!(out.stderr.contains("Habit not found: ghost"));
}

#[test]
fn edit_renames_an_existing_habit_in_place() {
    let harness = CliHarness::new();
    harness.run(
        &["add", "simple"],
        &["Read", "<BLANK>", "<BLANK>"],
        &["ENTER", "ENTER"],
    );
    let out = harness.run(
        &["edit", "read"],
        &["Read a chapter", "<KEEP>", "<KEEP>"],
        &["ENTER", "ENTER"],
    );
    assert_eq!(out.status, 0, "stderr: {}", out.stderr);
    assert!(out.stdout.contains("Saved habit `Read a chapter` (read)."));

    let raw = fs::read_to_string(harness.schema_path()).expect("schema");
    assert_eq!(raw.matches("\"id\"").count(), 1);
}

#[test]
fn validate_reports_a_broken_schema() {
    let harness = CliHarness::new();
    fs::write(
        harness.schema_path(),
        r#"{
  "version": "1.0.0",
  "created_date": "2024-03-01",
  "habits": [
    { "id": "walk", "title": "", "habit_type": "simple",
      "field_type": { "type": "boolean" }, "scoring_type": "manual" }
  ]
}"#,
    )
    .expect("seed");
    let out = harness.run(&["validate"], &[], &[]);
    assert_eq!(out.status, 1);
    assert!(out.stderr.contains("habit `walk`: title is required"));
}
