//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    Project::empty()
        .latch()
        .args(&["--help"])
        .passes()
        .stdout_has("drain")
        .stdout_has("contend")
        .stdout_has("config");
}

#[test]
fn drain_help_describes_flags() {
    Project::empty()
        .latch()
        .args(&["drain", "--help"])
        .passes()
        .stdout_has("--workers")
        .stdout_has("--fail-every")
        .stdout_has("--lock-entries");
}

#[test]
fn version_prints_package_version() {
    Project::empty()
        .latch()
        .args(&["--version"])
        .passes()
        .stdout_has("latch ");
}
