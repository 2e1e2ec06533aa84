//! Integration tests for the `slots` CLI binary.
//!
//! Uses `assert_cmd` and `predicates` to exercise the suggest, conflicts,
//! free, and lanes subcommands through the actual binary, including stdin
//! piping, fixture files, and failure paths.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the events.json fixture.
fn events_fixture() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/events.json")
}

fn slots() -> Command {
    Command::cargo_bin("slots").expect("binary builds")
}

// ─────────────────────────────────────────────────────────────────────────────
// Suggest subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn suggest_from_fixture_prints_ranked_slots() {
    slots()
        .args([
            "suggest",
            "--events",
            events_fixture(),
            "--duration",
            "30",
            "--anchor",
            "2026-03-16T00:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"slots\""))
        .stdout(predicate::str::contains("\"confidence\""))
        .stdout(predicate::str::contains("\"reason\""));
}

#[test]
fn suggest_reads_events_from_stdin() {
    slots()
        .args(["suggest", "--duration", "45", "--anchor", "2026-03-16T00:00:00Z"])
        .write_stdin("[]")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"alternatives\""));
}

#[test]
fn suggest_rejects_zero_duration() {
    slots()
        .args(["suggest", "--duration", "0", "--anchor", "2026-03-16T00:00:00Z"])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn suggest_rejects_unknown_event_type() {
    slots()
        .args([
            "suggest",
            "--duration",
            "30",
            "--event-type",
            "party",
            "--anchor",
            "2026-03-16T00:00:00Z",
        ])
        .write_stdin("[]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown event type"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Conflicts subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn conflicts_detects_every_overlapping_event() {
    slots()
        .args([
            "conflicts",
            "--events",
            events_fixture(),
            "--start",
            "2026-03-16T09:30:00Z",
            "--end",
            "2026-03-16T10:30:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("standup"))
        .stdout(predicate::str::contains("retro"))
        .stdout(predicate::str::contains("design-review"))
        .stdout(predicate::str::contains("overlap_minutes"));
}

#[test]
fn conflicts_excludes_the_candidates_own_owner() {
    slots()
        .args([
            "conflicts",
            "--events",
            events_fixture(),
            "--start",
            "2026-03-16T09:30:00Z",
            "--end",
            "2026-03-16T10:30:00Z",
            "--owner",
            "retro",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("retro").not())
        .stdout(predicate::str::contains("standup"));
}

#[test]
fn conflicts_empty_for_a_clear_range() {
    slots()
        .args([
            "conflicts",
            "--events",
            events_fixture(),
            "--start",
            "2026-03-16T15:00:00Z",
            "--end",
            "2026-03-16T16:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Free subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn free_lists_gaps_between_merged_events() {
    // Morning events merge into 09:00-11:00; gaps are 08:00-09:00,
    // 11:00-13:00, and 14:30-17:00 (150 minutes).
    slots()
        .args([
            "free",
            "--events",
            events_fixture(),
            "--from",
            "2026-03-16T08:00:00Z",
            "--to",
            "2026-03-16T17:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-16T11:00:00"))
        .stdout(predicate::str::contains("150"));
}

#[test]
fn free_honors_minimum_duration() {
    slots()
        .args([
            "free",
            "--events",
            events_fixture(),
            "--from",
            "2026-03-16T08:00:00Z",
            "--to",
            "2026-03-16T17:00:00Z",
            "--min-minutes",
            "90",
        ])
        .assert()
        .success()
        // The 60-minute 08:00-09:00 gap is filtered out.
        .stdout(predicate::str::contains("2026-03-16T08:00:00").not())
        .stdout(predicate::str::contains("2026-03-16T11:00:00"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Lanes subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn lanes_stack_only_the_overlapping_event() {
    // Only "retro" overlaps its neighbors; everything else fits lane 0.
    slots()
        .args(["lanes", "--events", events_fixture()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"retro\": 1"))
        .stdout(predicate::str::contains("\"standup\": 0"))
        .stdout(predicate::str::contains("\"design-review\": 0"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Failure paths
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn malformed_events_json_fails_with_context() {
    slots()
        .args(["lanes"])
        .write_stdin("this is not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("events input"));
}

#[test]
fn invalid_interval_in_events_fails() {
    let inverted =
        r#"[{"start":"2026-03-16T10:00:00Z","end":"2026-03-16T09:00:00Z","owner_id":"bad"}]"#;
    slots()
        .args(["lanes"])
        .write_stdin(inverted)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid interval for owner bad"));
}

#[test]
fn missing_events_file_fails() {
    slots()
        .args(["lanes", "--events", "/no/such/file.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
