// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work queue adapters

mod memory;

pub use memory::InMemoryQueue;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeQueue, QueueCall};

use async_trait::async_trait;
use latch_core::{EntryId, LeaseId, QueueEntry, QueueStats};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors from queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no entry became available in time")]
    Timeout,
    #[error("dequeue cancelled")]
    Cancelled,
    /// The lease was already resolved or reclaimed after its visibility timeout
    #[error("lease not found: {0}")]
    LeaseNotFound(LeaseId),
    #[error("queue unavailable: {0}")]
    Unavailable(String),
}

impl QueueError {
    /// Whether this error only means "nothing to do right now"
    pub fn is_timeout(&self) -> bool {
        matches!(self, QueueError::Timeout | QueueError::Cancelled)
    }
}

/// At-least-once queue with leased delivery
///
/// A dequeued entry is hidden from other consumers until it is completed,
/// abandoned, or its visibility timeout elapses. Implementations mark the
/// entry resolved (see [`QueueEntry::is_resolved`]) when `complete` or
/// `abandon` succeeds.
#[async_trait]
pub trait Queue<T: Send + Sync + 'static>: Clone + Send + Sync + 'static {
    async fn enqueue(&self, payload: T) -> Result<EntryId, QueueError>;

    /// Lease the next entry, waiting up to `wait` for one to arrive
    async fn dequeue(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<QueueEntry<T>, QueueError>;

    async fn complete(&self, entry: &QueueEntry<T>) -> Result<(), QueueError>;

    /// Return the entry for redelivery (or dead-letter it once retries are spent)
    async fn abandon(&self, entry: &QueueEntry<T>) -> Result<(), QueueError>;

    async fn stats(&self) -> Result<QueueStats, QueueError>;

    async fn queue_count(&self) -> Result<usize, QueueError> {
        Ok(self.stats().await?.queued)
    }

    async fn working_count(&self) -> Result<usize, QueueError> {
        Ok(self.stats().await?.working)
    }
}
