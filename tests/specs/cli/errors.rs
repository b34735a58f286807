//! CLI error specs

use crate::prelude::*;

#[test]
fn unknown_command_fails() {
    Project::empty()
        .latch()
        .args(&["frobnicate"])
        .fails()
        .stderr_has("unrecognized subcommand");
}

#[test]
fn zero_workers_is_rejected() {
    Project::empty()
        .latch()
        .args(&["drain", "--workers", "0"])
        .fails()
        .stderr_has("--workers");
}

#[test]
fn missing_config_file_fails() {
    Project::empty()
        .latch()
        .args(&["--config", "nope.toml", "config"])
        .fails()
        .stderr_has("nope.toml");
}

#[test]
fn invalid_config_value_fails() {
    let project = Project::empty();
    project.file("latch.toml", "[lock]\npoll_interval = \"0s\"\n");

    project
        .latch()
        .args(&["--config", "latch.toml", "config"])
        .fails()
        .stderr_has("lock.poll_interval");
}
