//! Contend command specs

use crate::prelude::*;

#[test]
fn every_worker_gets_the_lock_in_turn() {
    let project = Project::empty();
    project.file("latch.toml", FAST_CONFIG);

    project
        .latch()
        .args(&["--config", "latch.toml", "contend", "--workers", "4", "--hold-ms", "5"])
        .passes()
        .stdout_has("acquired: 4/4")
        .stdout_has("overlap: none");
}

#[test]
fn json_report_names_the_lock() {
    let project = Project::empty();
    project.file("latch.toml", FAST_CONFIG);

    let run = project
        .latch()
        .args(&[
            "--config",
            "latch.toml",
            "contend",
            "--workers",
            "3",
            "--name",
            "deploy",
            "--format",
            "json",
        ])
        .passes();

    let report = run.json();
    assert_eq!(report["name"], "deploy");
    assert_eq!(report["overlap"], false);
    assert_eq!(report["order"].as_array().unwrap().len(), 3);
}
