//! Drain command specs

use crate::prelude::*;

fn fast_project() -> Project {
    let project = Project::empty();
    project.file("latch.toml", FAST_CONFIG);
    project
}

#[test]
fn drains_every_item() {
    fast_project()
        .latch()
        .args(&["--config", "latch.toml", "drain", "--items", "6", "--workers", "3"])
        .passes()
        .stdout_has("completed: 6")
        .stdout_has("queued: 0")
        .stdout_has("working: 0");
}

#[test]
fn transient_failures_are_retried() {
    let run = fast_project()
        .latch()
        .args(&[
            "--config",
            "latch.toml",
            "drain",
            "--items",
            "6",
            "--fail-every",
            "2",
            "--format",
            "json",
        ])
        .passes();

    let report = run.json();
    assert_eq!(report["completed"], 6);
    assert_eq!(report["abandoned"], 3);
    assert_eq!(report["dead_lettered"], 0);
}

#[test]
fn poisoned_items_are_dead_lettered() {
    let run = fast_project()
        .latch()
        .args(&[
            "--config",
            "latch.toml",
            "drain",
            "--items",
            "4",
            "--poison-every",
            "4",
            "--format",
            "json",
        ])
        .passes();

    let report = run.json();
    assert_eq!(report["completed"], 3);
    assert_eq!(report["dead_lettered"], 1);
    assert_eq!(report["queued"], 0);
}

#[test]
fn locked_entries_still_drain() {
    fast_project()
        .latch()
        .args(&[
            "--config",
            "latch.toml",
            "drain",
            "--items",
            "5",
            "--workers",
            "2",
            "--lock-entries",
        ])
        .passes()
        .stdout_has("completed: 5");
}

#[test]
fn empty_queue_drains_immediately() {
    fast_project()
        .latch()
        .args(&["--config", "latch.toml", "drain", "--items", "0"])
        .passes()
        .stdout_has("processed: 0");
}
