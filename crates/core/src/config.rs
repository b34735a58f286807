// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for locks, queues and queue jobs
//!
//! Loaded from TOML; every field has a default so a partial file (or no file
//! at all) is valid. Durations use humantime syntax (`"250ms"`, `"5m"`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatchConfig {
    pub lock: LockConfig,
    pub queue: QueueConfig,
    pub job: JobConfig,
}

impl LatchConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "lock.poll_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.queue.work_item_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "queue.work_item_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.queue.recheck_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "queue.recheck_interval",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.job.entry_lock_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                field: "job.entry_lock_timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Lock provider settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Prefix applied to lock names in the key-value store
    pub key_prefix: String,
    /// Prefix applied to lock names to form their release topic
    pub topic_prefix: String,
    /// Fallback recheck while waiting, in case a release notice is lost
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            key_prefix: "lock:".to_string(),
            topic_prefix: "lock-released:".to_string(),
            poll_interval: Duration::from_millis(500),
        }
    }
}

impl LockConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn key_for(&self, name: &str) -> String {
        format!("{}{}", self.key_prefix, name)
    }

    pub fn topic_for(&self, name: &str) -> String {
        format!("{}{}", self.topic_prefix, name)
    }
}

/// In-memory queue settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Visibility timeout of a lease
    #[serde(with = "humantime_serde")]
    pub work_item_timeout: Duration,
    /// Abandons tolerated before an entry is dead-lettered
    pub retries: u32,
    /// Upper bound on how long a waiting dequeue goes without rechecking
    #[serde(with = "humantime_serde")]
    pub recheck_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            work_item_timeout: Duration::from_secs(300),
            retries: 2,
            recheck_interval: Duration::from_secs(1),
        }
    }
}

impl QueueConfig {
    pub fn with_work_item_timeout(mut self, timeout: Duration) -> Self {
        self.work_item_timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

/// Queue job engine settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Complete on success and abandon otherwise after processing
    pub auto_complete: bool,
    /// How long a single iteration waits for an entry
    #[serde(with = "humantime_serde")]
    pub dequeue_timeout: Duration,
    /// Backoff after an iteration that found no work
    #[serde(with = "humantime_serde")]
    pub idle_delay: Duration,
    /// TTL of the per-entry lock
    #[serde(with = "humantime_serde")]
    pub entry_lock_timeout: Duration,
    /// How long to wait for the per-entry lock; zero fails immediately
    #[serde(with = "humantime_serde")]
    pub entry_lock_wait: Duration,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            auto_complete: true,
            dequeue_timeout: Duration::from_secs(1),
            idle_delay: Duration::from_millis(100),
            entry_lock_timeout: Duration::from_secs(300),
            entry_lock_wait: Duration::ZERO,
        }
    }
}

impl JobConfig {
    pub fn with_auto_complete(mut self, auto_complete: bool) -> Self {
        self.auto_complete = auto_complete;
        self
    }

    pub fn with_dequeue_timeout(mut self, timeout: Duration) -> Self {
        self.dequeue_timeout = timeout;
        self
    }

    pub fn with_idle_delay(mut self, delay: Duration) -> Self {
        self.idle_delay = delay;
        self
    }

    pub fn with_entry_lock(mut self, timeout: Duration, wait: Duration) -> Self {
        self.entry_lock_timeout = timeout;
        self.entry_lock_wait = wait;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
