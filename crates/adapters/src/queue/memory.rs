// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process work queue

use super::{Queue, QueueError};
use async_trait::async_trait;
use latch_core::{
    Abandoned, Clock, DeadLetter, EntryId, IdGen, LeaseError, LeaseId, QueueConfig, QueueEntry,
    QueueState, QueueStats, SystemClock, UuidIdGen,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

struct Shared<T> {
    state: Mutex<QueueState<T>>,
    available: Notify,
}

/// Queue held in process memory
///
/// Waiting consumers are woken when an entry is enqueued or requeued and
/// also recheck every `recheck_interval`, which is how leases past their
/// visibility timeout get reclaimed.
pub struct InMemoryQueue<T, C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    shared: Arc<Shared<T>>,
    config: QueueConfig,
    clock: C,
    ids: I,
}

impl<T, C: Clock, I: IdGen> Clone for InMemoryQueue<T, C, I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            config: self.config.clone(),
            clock: self.clock.clone(),
            ids: self.ids.clone(),
        }
    }
}

impl<T: Clone> InMemoryQueue<T> {
    pub fn new(config: QueueConfig) -> Self {
        Self::with_parts(config, SystemClock, UuidIdGen)
    }
}

impl<T: Clone, C: Clock, I: IdGen> InMemoryQueue<T, C, I> {
    pub fn with_parts(config: QueueConfig, clock: C, ids: I) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::new(config.retries)),
                available: Notify::new(),
            }),
            config,
            clock,
            ids,
        }
    }

    /// Entries that exhausted their retries
    pub fn dead_letters(&self) -> Vec<DeadLetter<T>> {
        self.lock().dead_letters().to_vec()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState<T>> {
        self.shared.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn try_lease(&self) -> Option<QueueEntry<T>> {
        let mut state = self.lock();
        let reclaimed = state.reclaim_expired(&self.clock);
        for id in &reclaimed {
            tracing::warn!(entry = %id, "lease expired, entry returned to queue");
        }
        state.lease(
            LeaseId::new(self.ids.next()),
            self.config.work_item_timeout,
            &self.clock,
        )
    }
}

#[async_trait]
impl<T, C, I> Queue<T> for InMemoryQueue<T, C, I>
where
    T: Clone + Send + Sync + 'static,
    C: Clock,
    I: IdGen,
{
    async fn enqueue(&self, payload: T) -> Result<EntryId, QueueError> {
        let id = EntryId::new(self.ids.next());
        self.lock().push(id.clone(), payload);
        self.shared.available.notify_waiters();
        tracing::debug!(entry = %id, "enqueued");
        Ok(id)
    }

    async fn dequeue(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<QueueEntry<T>, QueueError> {
        // `None` when `wait` is too large to represent: wait indefinitely
        let deadline = Instant::now().checked_add(wait);
        loop {
            // Register for wakeups before checking, so an enqueue between the
            // check and the wait is not missed
            let notified = self.shared.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(entry) = self.try_lease() {
                tracing::debug!(entry = %entry.id, attempts = entry.attempts, "dequeued");
                return Ok(entry);
            }
            if cancel.is_cancelled() {
                return Err(QueueError::Cancelled);
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                return Err(QueueError::Timeout);
            }
            let recheck = [deadline, now.checked_add(self.config.recheck_interval)]
                .into_iter()
                .flatten()
                .min();

            tokio::select! {
                _ = cancel.cancelled() => return Err(QueueError::Cancelled),
                _ = notified.as_mut() => {}
                _ = sleep_until(recheck) => {}
            }
        }
    }

    async fn complete(&self, entry: &QueueEntry<T>) -> Result<(), QueueError> {
        {
            let mut state = self.lock();
            state.reclaim_expired(&self.clock);
            state.complete(&entry.lease_id).map_err(lease_error)?;
        }
        tracing::debug!(entry = %entry.id, "completed");
        Ok(())
    }

    async fn abandon(&self, entry: &QueueEntry<T>) -> Result<(), QueueError> {
        let outcome = {
            let mut state = self.lock();
            state.reclaim_expired(&self.clock);
            state
                .abandon(&entry.lease_id, "abandoned by consumer")
                .map_err(lease_error)?
        };

        match outcome {
            Abandoned::Requeued { attempts } => {
                self.shared.available.notify_waiters();
                tracing::debug!(entry = %entry.id, attempts, "abandoned, requeued");
            }
            Abandoned::DeadLettered { attempts } => {
                tracing::warn!(entry = %entry.id, attempts, "abandoned, dead-lettered");
            }
        }
        Ok(())
    }

    async fn stats(&self) -> Result<QueueStats, QueueError> {
        let mut state = self.lock();
        state.reclaim_expired(&self.clock);
        Ok(state.stats())
    }
}

/// Sleep until `at`; never resolves for `None`
async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn lease_error(err: LeaseError) -> QueueError {
    match err {
        LeaseError::NotFound(id) => QueueError::LeaseNotFound(id),
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
