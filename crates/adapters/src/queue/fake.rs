// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording queue for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{InMemoryQueue, Queue, QueueError};
use async_trait::async_trait;
use latch_core::{
    DeadLetter, EntryId, FakeClock, QueueConfig, QueueEntry, QueueStats, SequentialIdGen,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Recorded queue call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Enqueue { entry: EntryId },
    Dequeue { entry: Option<EntryId> },
    Complete { entry: EntryId },
    Abandon { entry: EntryId },
}

/// In-memory queue on a fake clock that records calls and can inject failures
pub struct FakeQueue<T> {
    inner: InMemoryQueue<T, FakeClock, SequentialIdGen>,
    clock: FakeClock,
    calls: Arc<Mutex<Vec<QueueCall>>>,
    failing_dequeue: Arc<AtomicBool>,
    failing_resolution: Arc<AtomicBool>,
}

impl<T> Clone for FakeQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            clock: self.clock.clone(),
            calls: Arc::clone(&self.calls),
            failing_dequeue: Arc::clone(&self.failing_dequeue),
            failing_resolution: Arc::clone(&self.failing_resolution),
        }
    }
}

impl<T: Clone> FakeQueue<T> {
    pub fn new(config: QueueConfig) -> Self {
        let clock = FakeClock::new();
        Self {
            inner: InMemoryQueue::with_parts(config, clock.clone(), SequentialIdGen::new("fake")),
            clock,
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_dequeue: Arc::new(AtomicBool::new(false)),
            failing_resolution: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Clock driving lease visibility
    pub fn clock(&self) -> &FakeClock {
        &self.clock
    }

    pub fn set_failing_dequeue(&self, failing: bool) {
        self.failing_dequeue.store(failing, Ordering::SeqCst);
    }

    /// Fail every complete and abandon
    pub fn set_failing_resolution(&self, failing: bool) {
        self.failing_resolution.store(failing, Ordering::SeqCst);
    }

    pub fn dead_letters(&self) -> Vec<DeadLetter<T>> {
        self.inner.dead_letters()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<QueueCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Completions and abandons, in order
    pub fn resolutions(&self) -> Vec<QueueCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, QueueCall::Complete { .. } | QueueCall::Abandon { .. }))
            .collect()
    }

    fn record(&self, call: QueueCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn check_resolution(&self) -> Result<(), QueueError> {
        if self.failing_resolution.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable("injected resolution failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> Queue<T> for FakeQueue<T> {
    async fn enqueue(&self, payload: T) -> Result<EntryId, QueueError> {
        let entry = self.inner.enqueue(payload).await?;
        self.record(QueueCall::Enqueue {
            entry: entry.clone(),
        });
        Ok(entry)
    }

    async fn dequeue(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<QueueEntry<T>, QueueError> {
        if self.failing_dequeue.load(Ordering::SeqCst) {
            self.record(QueueCall::Dequeue { entry: None });
            return Err(QueueError::Unavailable("injected dequeue failure".to_string()));
        }
        let result = self.inner.dequeue(wait, cancel).await;
        self.record(QueueCall::Dequeue {
            entry: result.as_ref().ok().map(|e| e.id.clone()),
        });
        result
    }

    async fn complete(&self, entry: &QueueEntry<T>) -> Result<(), QueueError> {
        self.record(QueueCall::Complete {
            entry: entry.id.clone(),
        });
        self.check_resolution()?;
        self.inner.complete(entry).await
    }

    async fn abandon(&self, entry: &QueueEntry<T>) -> Result<(), QueueError> {
        self.record(QueueCall::Abandon {
            entry: entry.id.clone(),
        });
        self.check_resolution()?;
        self.inner.abandon(entry).await
    }

    async fn stats(&self) -> Result<QueueStats, QueueError> {
        self.inner.stats().await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
