// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::kv::{KeyValueStore, StoreError};
use crate::queue::{Queue, QueueError};
use async_trait::async_trait;
use latch_core::{EntryId, QueueEntry, QueueStats};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Wrapper that adds tracing to any KeyValueStore
#[derive(Clone)]
pub struct TracedKeyValueStore<S> {
    inner: S,
}

impl<S> TracedKeyValueStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: KeyValueStore> KeyValueStore for TracedKeyValueStore<S> {
    async fn try_add(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("kv.try_add", key);
        let start = Instant::now();
        let result = self.inner.try_add(key, value, ttl).instrument(span.clone()).await;

        let _guard = span.enter();
        match &result {
            Ok(added) => tracing::debug!(added, elapsed_ms = elapsed_ms(start), "try_add"),
            Err(e) => tracing::error!(elapsed_ms = elapsed_ms(start), error = %e, "try_add failed"),
        }
        result
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let result = self.inner.get(key).await;
        tracing::trace!(key, found = ?result.as_ref().ok().map(Option::is_some), "get");
        result
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("kv.remove", key);
        let result = self.inner.remove(key).instrument(span.clone()).await;

        let _guard = span.enter();
        match &result {
            Ok(removed) => tracing::debug!(removed, "removed"),
            Err(e) => tracing::error!(error = %e, "remove failed"),
        }
        result
    }

    async fn compare_and_remove(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("kv.compare_and_remove", key);
        let start = Instant::now();
        let result = self
            .inner
            .compare_and_remove(key, expected)
            .instrument(span.clone())
            .await;

        let _guard = span.enter();
        match &result {
            Ok(removed) => {
                tracing::debug!(removed, elapsed_ms = elapsed_ms(start), "compare_and_remove")
            }
            Err(e) => tracing::error!(
                elapsed_ms = elapsed_ms(start),
                error = %e,
                "compare_and_remove failed"
            ),
        }
        result
    }

    async fn try_update_expiry(
        &self,
        key: &str,
        expected: &str,
        ttl: Option<Duration>,
    ) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("kv.try_update_expiry", key, ttl = ?ttl);
        let result = self
            .inner
            .try_update_expiry(key, expected, ttl)
            .instrument(span.clone())
            .await;

        let _guard = span.enter();
        match &result {
            Ok(updated) => tracing::debug!(updated, "try_update_expiry"),
            Err(e) => tracing::error!(error = %e, "try_update_expiry failed"),
        }
        result
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let result = self.inner.exists(key).await;
        tracing::trace!(key, exists = ?result.as_ref().ok(), "checked");
        result
    }

    async fn increment(
        &self,
        key: &str,
        amount: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError> {
        let result = self.inner.increment(key, amount, ttl).await;
        match &result {
            Ok(value) => tracing::trace!(key, amount, value, "incremented"),
            Err(e) => tracing::warn!(key, amount, error = %e, "increment failed"),
        }
        result
    }
}

/// Wrapper that adds tracing to any Queue
#[derive(Clone)]
pub struct TracedQueue<Q> {
    inner: Q,
}

impl<Q> TracedQueue<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T, Q> Queue<T> for TracedQueue<Q>
where
    T: Send + Sync + 'static,
    Q: Queue<T>,
{
    async fn enqueue(&self, payload: T) -> Result<EntryId, QueueError> {
        let result = self.inner.enqueue(payload).await;
        match &result {
            Ok(id) => tracing::info!(entry = %id, "enqueued"),
            Err(e) => tracing::error!(error = %e, "enqueue failed"),
        }
        result
    }

    async fn dequeue(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<QueueEntry<T>, QueueError> {
        let span = tracing::info_span!("queue.dequeue", wait_ms = wait.as_millis() as u64);
        let start = Instant::now();
        let result = self.inner.dequeue(wait, cancel).instrument(span.clone()).await;

        let _guard = span.enter();
        match &result {
            Ok(entry) => tracing::info!(
                entry = %entry.id,
                attempts = entry.attempts,
                elapsed_ms = elapsed_ms(start),
                "dequeued"
            ),
            Err(e) if e.is_timeout() => {
                tracing::trace!(elapsed_ms = elapsed_ms(start), reason = %e, "nothing dequeued")
            }
            Err(e) => tracing::error!(elapsed_ms = elapsed_ms(start), error = %e, "dequeue failed"),
        }
        result
    }

    async fn complete(&self, entry: &QueueEntry<T>) -> Result<(), QueueError> {
        let span = tracing::info_span!("queue.complete", entry = %entry.id);
        let result = self.inner.complete(entry).instrument(span.clone()).await;

        let _guard = span.enter();
        match &result {
            Ok(()) => tracing::info!("completed"),
            Err(e) => tracing::warn!(error = %e, "complete failed"),
        }
        result
    }

    async fn abandon(&self, entry: &QueueEntry<T>) -> Result<(), QueueError> {
        let span = tracing::info_span!("queue.abandon", entry = %entry.id, attempts = entry.attempts);
        let result = self.inner.abandon(entry).instrument(span.clone()).await;

        let _guard = span.enter();
        match &result {
            Ok(()) => tracing::info!("abandoned"),
            Err(e) => tracing::warn!(error = %e, "abandon failed"),
        }
        result
    }

    async fn stats(&self) -> Result<QueueStats, QueueError> {
        let result = self.inner.stats().await;
        tracing::trace!(stats = ?result.as_ref().ok(), "stats");
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
