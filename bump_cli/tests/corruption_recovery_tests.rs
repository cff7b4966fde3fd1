//! Corruption recovery tests.
//!
//! The stores are expected to degrade gracefully: bad WAL lines are
//! skipped, and an unreadable profile or checkup book falls back to
//! first-run behavior instead of wedging the app.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("bump"))
}

#[test]
fn test_corrupt_wal_line_does_not_break_history() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("count")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--auto-kicks")
        .arg("4")
        .assert()
        .success();

    // Garbage appended mid-log, then another good session.
    let wal_path = temp_dir.path().join("wal/movement_sessions.wal");
    let mut content = fs::read_to_string(&wal_path).unwrap();
    content.push_str("{{{ definitely not json\n");
    fs::write(&wal_path, content).unwrap();

    cli()
        .arg("count")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--auto-kicks")
        .arg("7")
        .assert()
        .success();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 sessions"));
}

#[test]
fn test_corrupt_profile_falls_back_to_first_run() {
    let temp_dir = setup_test_dir();

    fs::write(temp_dir.path().join("profile.json"), "{ not json }").unwrap();

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No profile yet"));
}

#[test]
fn test_corrupt_checkup_book_starts_empty() {
    let temp_dir = setup_test_dir();

    fs::write(temp_dir.path().join("checkups.json"), "][").unwrap();

    cli()
        .arg("checkup")
        .arg("list")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No checkups scheduled"));

    // Adding after corruption rewrites a clean book.
    cli()
        .arg("checkup")
        .arg("add")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--date")
        .arg("2030-03-01 10:00")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added checkup"));

    cli()
        .arg("checkup")
        .arg("list")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Routine checkup"));
}
