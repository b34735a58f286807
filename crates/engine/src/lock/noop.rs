// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op lock provider

use super::{validate, LockProvider};
use crate::error::LockError;
use async_trait::async_trait;
use latch_core::{HolderToken, LockHandle};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Lock provider that grants every request and tracks nothing
///
/// Used when entries need no mutual exclusion.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpLockProvider;

impl NoOpLockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LockProvider for NoOpLockProvider {
    async fn acquire(
        &self,
        name: &str,
        lock_timeout: Option<Duration>,
        _acquire_timeout: Duration,
        _cancel: &CancellationToken,
    ) -> Result<Option<LockHandle>, LockError> {
        validate(name, lock_timeout)?;
        Ok(Some(LockHandle::new(
            name,
            HolderToken::new("noop"),
            Instant::now(),
            lock_timeout,
        )))
    }

    async fn release(&self, _lock: &LockHandle) -> bool {
        true
    }

    async fn renew(&self, _lock: &LockHandle, _lock_timeout: Option<Duration>) -> bool {
        true
    }

    async fn is_locked(&self, _name: &str) -> Result<bool, LockError> {
        Ok(false)
    }
}
