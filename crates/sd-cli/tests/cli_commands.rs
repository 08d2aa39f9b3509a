//! Integration tests for the CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A pit (sector 0) next to a lift sector tagged 5, with one monster in the
/// lift.
const LIFT_LEVEL: &str = r#"{
    "name": "Test Lift",
    "sectors": [
        {"floor_height": -64, "ceiling_height": 128},
        {"floor_height": 0, "ceiling_height": 60, "tag": 5}
    ],
    "lines": [
        {"front": 0, "back": 1}
    ],
    "actors": [
        {"id": 1, "sector": 1, "height": 56, "health": 100}
    ]
}"#;

const LIFT_SCRIPT: &str = r#"[
    {"type": "plat", "kind": "down_wait_up_stay", "tag": 5, "speed": 8.0, "delay": 10}
]"#;

const CRUSH_SCRIPT: &str = r#"[
    {"type": "ceiling", "kind": "crush_and_raise", "tag": 5, "speed": 8.0, "height": 8.0, "crush": 10}
]"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("level.json"), LIFT_LEVEL).unwrap();
        fs::write(dir.path().join("lift.json"), LIFT_SCRIPT).unwrap();
        fs::write(dir.path().join("crush.json"), CRUSH_SCRIPT).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).to_str().unwrap().to_string()
    }
}

fn sd() -> Command {
    Command::cargo_bin("sd").unwrap()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_level_contents() {
    let ws = Workspace::new();
    sd().args(["check", &ws.arg("level.json")])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("All checks passed for 'Test Lift'")
                .and(predicate::str::contains("2 sectors, 1 lines (1 two-sided), 1 tags, 1 actors")),
        );
}

#[test]
fn check_rejects_dangling_lines() {
    let ws = Workspace::new();
    fs::write(
        ws.path("broken.json"),
        r#"{"sectors": [{"floor_height": 0, "ceiling_height": 128}], "lines": [{"front": 0, "back": 3}]}"#,
    )
    .unwrap();
    sd().args(["check", &ws.arg("broken.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("references missing sector"));
}

#[test]
fn check_rejects_inverted_sectors() {
    let ws = Workspace::new();
    fs::write(
        ws.path("inverted.json"),
        r#"{"sectors": [{"floor_height": 64, "ceiling_height": 0}]}"#,
    )
    .unwrap();
    sd().args(["check", &ws.arg("inverted.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("floor above its ceiling"));
}

#[test]
fn check_fails_on_missing_file() {
    let ws = Workspace::new();
    sd().args(["check", &ws.arg("nope.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_without_script_only_advances_time() {
    let ws = Workspace::new();
    sd().args(["run", &ws.arg("level.json"), "--tics", "70"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Test Lift")
                .and(predicate::str::contains("0 of 0 activations took effect"))
                .and(predicate::str::contains("Level time: 2.00s")),
        );
}

#[test]
fn run_lowers_the_lift() {
    let ws = Workspace::new();
    sd().args([
        "run",
        &ws.arg("level.json"),
        "--script",
        &ws.arg("lift.json"),
        "--tics",
        "10",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("1 of 1 activations took effect, 1 movers still running")
            .and(predicate::str::contains("-64"))
            .and(predicate::str::contains("plat (mover 1)")),
    );
}

#[test]
fn run_verbose_lists_events() {
    let ws = Workspace::new();
    sd().args([
        "run",
        &ws.arg("level.json"),
        "--script",
        &ws.arg("lift.json"),
        "--tics",
        "40",
        "--verbose",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("Event Log")
            .and(predicate::str::contains("plat mover 1 started on sector #1"))
            .and(predicate::str::contains("plat mover 1 finished on sector #1")),
    );
}

#[test]
fn run_reports_crushed_actors() {
    let ws = Workspace::new();
    sd().args([
        "run",
        &ws.arg("level.json"),
        "--script",
        &ws.arg("crush.json"),
        "--tics",
        "3",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("CRUSH")
            .and(predicate::str::contains("1 actor(s) crushed in sector #1"))
            .and(predicate::str::contains("ceiling (mover 1)")),
    );
}

#[test]
fn run_skips_activations_without_targets() {
    let ws = Workspace::new();
    fs::write(
        ws.path("idle.json"),
        r#"[{"type": "door", "kind": "raise", "tag": 42, "speed": 2.0}]"#,
    )
    .unwrap();
    sd().args(["run", &ws.arg("level.json"), "--script", &ws.arg("idle.json")])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("door (tag 42) had no effect")
                .and(predicate::str::contains("0 of 1 activations took effect")),
        );
}

#[test]
fn run_rejects_unknown_activation_types() {
    let ws = Workspace::new();
    fs::write(ws.path("bad.json"), r#"[{"type": "teleport", "tag": 5}]"#).unwrap();
    sd().args(["run", &ws.arg("level.json"), "--script", &ws.arg("bad.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown variant"));
}

#[test]
fn run_rejects_unknown_crush_mode() {
    let ws = Workspace::new();
    sd().args(["run", &ws.arg("level.json"), "--crush-mode", "gentle"])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// resume
// ---------------------------------------------------------------------------

#[test]
fn saved_snapshot_resumes_where_it_left_off() {
    let ws = Workspace::new();
    sd().args([
        "run",
        &ws.arg("level.json"),
        "--script",
        &ws.arg("lift.json"),
        "--tics",
        "10",
        "--save",
        &ws.arg("snap.json"),
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Snapshot written"));
    assert!(ws.path("snap.json").exists());

    sd().args([
        "resume",
        &ws.arg("level.json"),
        &ws.arg("snap.json"),
        "--tics",
        "30",
    ])
    .assert()
    .success()
    .stdout(
        predicate::str::contains("(tic 10 + 30 tics)")
            .and(predicate::str::contains("1 movers and 0 scrollers restored")),
    );
}

#[test]
fn resume_rejects_snapshots_of_other_levels() {
    let ws = Workspace::new();
    sd().args([
        "run",
        &ws.arg("level.json"),
        "--tics",
        "1",
        "--save",
        &ws.arg("snap.json"),
    ])
    .assert()
    .success();
    fs::write(
        ws.path("small.json"),
        r#"{"sectors": [{"floor_height": 0, "ceiling_height": 128}]}"#,
    )
    .unwrap();

    sd().args(["resume", &ws.arg("small.json"), &ws.arg("snap.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot restore"));
}

#[test]
fn resume_fails_on_malformed_snapshot() {
    let ws = Workspace::new();
    fs::write(ws.path("snap.json"), "{ not json").unwrap();
    sd().args(["resume", &ws.arg("level.json"), &ws.arg("snap.json")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("snap.json"));
}
