// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault-injecting key-value store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{InMemoryKeyValueStore, KeyValueStore, StoreError};
use async_trait::async_trait;
use latch_core::FakeClock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded store operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: &'static str,
    pub key: String,
}

/// In-memory store on a fake clock that records calls and can be told to fail
#[derive(Clone)]
pub struct FailingKeyValueStore {
    inner: InMemoryKeyValueStore<FakeClock>,
    clock: FakeClock,
    failing: Arc<AtomicBool>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl Default for FailingKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FailingKeyValueStore {
    pub fn new() -> Self {
        let clock = FakeClock::new();
        Self {
            inner: InMemoryKeyValueStore::with_clock(clock.clone()),
            clock,
            failing: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Clock driving key expiry
    pub fn clock(&self) -> &FakeClock {
        &self.clock
    }

    /// Make every subsequent operation fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Count recorded calls of one operation
    pub fn count(&self, op: &str) -> usize {
        self.calls().iter().filter(|c| c.op == op).count()
    }

    fn record(&self, op: &'static str, key: &str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(StoreCall {
                op,
                key: key.to_string(),
            });
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected failure in {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn try_add(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        self.record("try_add", key)?;
        self.inner.try_add(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.record("get", key)?;
        self.inner.get(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.record("remove", key)?;
        self.inner.remove(key).await
    }

    async fn compare_and_remove(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        self.record("compare_and_remove", key)?;
        self.inner.compare_and_remove(key, expected).await
    }

    async fn try_update_expiry(
        &self,
        key: &str,
        expected: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        self.record("try_update_expiry", key)?;
        self.inner.try_update_expiry(key, expected, ttl).await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.record("exists", key)?;
        self.inner.exists(key).await
    }

    async fn increment(
        &self,
        key: &str,
        amount: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError> {
        self.record("increment", key)?;
        self.inner.increment(key, amount, ttl).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
