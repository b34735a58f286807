//! Config command specs

use crate::prelude::*;

#[test]
fn defaults_are_printed_without_a_config_file() {
    Project::empty()
        .latch()
        .args(&["config"])
        .passes()
        .stdout_has("[lock]")
        .stdout_has("key_prefix = \"lock:\"")
        .stdout_has("poll_interval = \"500ms\"")
        .stdout_has("auto_complete = true");
}

#[test]
fn explicit_config_overrides_defaults() {
    let project = Project::empty();
    project.file("latch.toml", "[queue]\nretries = 7\n");

    project
        .latch()
        .args(&["--config", "latch.toml", "config"])
        .passes()
        .stdout_has("retries = 7");
}

#[test]
fn default_config_file_is_picked_up() {
    let project = Project::empty();
    let path = project.latch().args(&["config", "--path"]).passes();
    let path = std::path::PathBuf::from(path.stdout().trim());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "[job]\nauto_complete = false\n").unwrap();

    project
        .latch()
        .args(&["config"])
        .passes()
        .stdout_has("auto_complete = false");
}

#[test]
fn path_flag_prints_default_location() {
    Project::empty()
        .latch()
        .args(&["config", "--path"])
        .passes()
        .stdout_has("latch/config.toml");
}
