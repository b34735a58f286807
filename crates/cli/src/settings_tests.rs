// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[test]
fn explicit_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let explicit = dir.path().join("explicit.toml");
    let fallback = dir.path().join("fallback.toml");
    std::fs::write(&explicit, "[queue]\nretries = 7\n").unwrap();
    std::fs::write(&fallback, "[queue]\nretries = 1\n").unwrap();

    let config = resolve_from(Some(&explicit), Some(&fallback)).unwrap();

    assert_eq!(config.queue.retries, 7);
}

#[test]
fn missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");

    let err = resolve_from(Some(&missing), None).unwrap_err();

    assert!(format!("{err:#}").contains("missing.toml"));
}

#[test]
fn existing_fallback_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let fallback = dir.path().join("config.toml");
    std::fs::write(&fallback, "[lock]\npoll_interval = \"2s\"\n").unwrap();

    let config = resolve_from(None, Some(&fallback)).unwrap();

    assert_eq!(config.lock.poll_interval, Duration::from_secs(2));
}

#[test]
fn absent_fallback_means_defaults() {
    let dir = tempfile::tempdir().unwrap();

    let config = resolve_from(None, Some(&dir.path().join("nope.toml"))).unwrap();

    assert_eq!(config, LatchConfig::default());
}
