// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn empty_document_uses_defaults() {
    let config = LatchConfig::from_toml_str("").unwrap();
    assert_eq!(config, LatchConfig::default());
    assert!(config.job.auto_complete);
    assert_eq!(config.queue.retries, 2);
}

#[test]
fn partial_document_overrides_only_given_fields() {
    let config = LatchConfig::from_toml_str(
        r#"
        [lock]
        poll_interval = "250ms"

        [job]
        auto_complete = false
        entry_lock_wait = "2s"
        "#,
    )
    .unwrap();

    assert_eq!(config.lock.poll_interval, Duration::from_millis(250));
    assert_eq!(config.lock.key_prefix, "lock:");
    assert!(!config.job.auto_complete);
    assert_eq!(config.job.entry_lock_wait, Duration::from_secs(2));
    assert_eq!(config.job.dequeue_timeout, Duration::from_secs(1));
}

#[test]
fn rendered_config_parses_back() {
    let config = LatchConfig {
        queue: QueueConfig::default()
            .with_retries(5)
            .with_work_item_timeout(Duration::from_secs(90)),
        ..LatchConfig::default()
    };

    let text = config.to_toml_string().unwrap();
    assert!(text.contains("work_item_timeout = \"1m 30s\""));
    assert_eq!(LatchConfig::from_toml_str(&text).unwrap(), config);
}

#[parameterized(
    zero_poll = { "[lock]\npoll_interval = \"0s\"", "lock.poll_interval" },
    zero_visibility = { "[queue]\nwork_item_timeout = \"0s\"", "queue.work_item_timeout" },
    zero_recheck = { "[queue]\nrecheck_interval = \"0s\"", "queue.recheck_interval" },
    zero_entry_lock = { "[job]\nentry_lock_timeout = \"0s\"", "job.entry_lock_timeout" },
)]
fn zero_durations_are_rejected(text: &str, expected_field: &str) {
    let err = LatchConfig::from_toml_str(text).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field, .. } if field == expected_field));
}

#[test]
fn malformed_duration_is_a_parse_error() {
    let err = LatchConfig::from_toml_str("[job]\nidle_delay = \"soon\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.toml");

    let err = LatchConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { path: p, .. } if p == path));
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latch.toml");
    std::fs::write(&path, "[queue]\nretries = 0\n").unwrap();

    let config = LatchConfig::load(&path).unwrap();
    assert_eq!(config.queue.retries, 0);
}

#[test]
fn lock_keys_and_topics_are_prefixed() {
    let lock = LockConfig::default();
    assert_eq!(lock.key_for("job-1"), "lock:job-1");
    assert_eq!(lock.topic_for("job-1"), "lock-released:job-1");
}
