// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value store adapters

mod memory;

pub use memory::InMemoryKeyValueStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FailingKeyValueStore, StoreCall};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from key-value operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("value at {key} is not an integer")]
    NotAnInteger { key: String },
}

/// Shared key-value storage with per-key expiry
///
/// A `ttl` of `None` means the key never expires. Expired keys behave
/// exactly like absent keys for every operation.
#[async_trait]
pub trait KeyValueStore: Clone + Send + Sync + 'static {
    /// Set `key` only if it is absent; returns whether it was set
    async fn try_add(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> Result<bool, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove `key`; returns whether it was present
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove `key` only if its value equals `expected`
    async fn compare_and_remove(&self, key: &str, expected: &str) -> Result<bool, StoreError>;

    /// Reset the expiry of `key` only if its value equals `expected`
    async fn try_update_expiry(
        &self,
        key: &str,
        expected: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Add `amount` to the integer at `key`, starting from zero when absent.
    /// A `ttl` resets the expiry; `None` leaves it unchanged.
    async fn increment(
        &self,
        key: &str,
        amount: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError>;
}
