// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for locks and the job engine

use latch_adapters::{QueueError, StoreError};
use latch_core::EntryId;
use thiserror::Error;

/// Error raised by caller-supplied processing logic
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from the lock provider
///
/// Contention and acquire timeouts are not errors; `acquire` reports them
/// as `Ok(None)`.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock name must not be empty")]
    InvalidName,
    #[error("lock timeout must be greater than zero")]
    InvalidTimeout,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors that halt a job run
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("processing entry {entry} failed: {source}")]
    Processing {
        entry: EntryId,
        #[source]
        source: BoxError,
    },
}
