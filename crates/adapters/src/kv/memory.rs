// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process key-value store

use super::{KeyValueStore, StoreError};
use async_trait::async_trait;
use latch_core::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
struct Slot {
    value: String,
    expires_at: Option<Instant>,
}

/// Key-value store held in process memory
///
/// Expiry is lazy: an expired key is dropped the next time any operation
/// touches it.
#[derive(Clone)]
pub struct InMemoryKeyValueStore<C: Clock = SystemClock> {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
    clock: C,
}

impl InMemoryKeyValueStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryKeyValueStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryKeyValueStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.retain(|_, slot| !self.clock.has_passed(slot.expires_at));
        slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against the live slot for `key`, dropping it first if expired
    fn with_slot<R>(&self, key: &str, f: impl FnOnce(&mut HashMap<String, Slot>) -> R) -> R {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots
            .get(key)
            .is_some_and(|slot| self.clock.has_passed(slot.expires_at))
        {
            slots.remove(key);
        }
        f(&mut slots)
    }
}

#[async_trait]
impl<C: Clock> KeyValueStore for InMemoryKeyValueStore<C> {
    async fn try_add(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let expires_at = self.clock.deadline(ttl);
        Ok(self.with_slot(key, |slots| {
            if slots.contains_key(key) {
                return false;
            }
            slots.insert(
                key.to_string(),
                Slot {
                    value: value.to_string(),
                    expires_at,
                },
            );
            true
        }))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.with_slot(key, |slots| {
            slots.get(key).map(|slot| slot.value.clone())
        }))
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.with_slot(key, |slots| slots.remove(key).is_some()))
    }

    async fn compare_and_remove(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        Ok(self.with_slot(key, |slots| {
            if slots.get(key).is_some_and(|slot| slot.value == expected) {
                slots.remove(key);
                true
            } else {
                false
            }
        }))
    }

    async fn try_update_expiry(
        &self,
        key: &str,
        expected: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let expires_at = self.clock.deadline(ttl);
        Ok(self.with_slot(key, |slots| match slots.get_mut(key) {
            Some(slot) if slot.value == expected => {
                slot.expires_at = expires_at;
                true
            }
            _ => false,
        }))
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.with_slot(key, |slots| slots.contains_key(key)))
    }

    async fn increment(
        &self,
        key: &str,
        amount: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError> {
        let expires_at = self.clock.deadline(ttl);
        self.with_slot(key, |slots| {
            let slot = slots.entry(key.to_string()).or_insert_with(|| Slot {
                value: "0".to_string(),
                expires_at: None,
            });
            let current: i64 = slot.value.parse().map_err(|_| StoreError::NotAnInteger {
                key: key.to_string(),
            })?;
            let next = current.saturating_add(amount);
            slot.value = next.to_string();
            if ttl.is_some() {
                slot.expires_at = expires_at;
            }
            Ok(next)
        })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
