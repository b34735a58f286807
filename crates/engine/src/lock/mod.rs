// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named, time-bounded mutual exclusion
//!
//! Exclusivity rests entirely on the store's atomic add-if-absent and
//! compare-and-remove. Release notifications only shorten the wait of
//! blocked acquirers; a lost notification costs at most one poll interval.

mod cache;
mod noop;

pub use cache::CacheLockProvider;
pub use noop::NoOpLockProvider;

use crate::error::LockError;
use async_trait::async_trait;
use latch_core::LockHandle;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Grants and revokes named exclusive locks
#[async_trait]
pub trait LockProvider: Clone + Send + Sync + 'static {
    /// Acquire `name`, waiting up to `acquire_timeout` while it is held
    ///
    /// `lock_timeout` is the lock's TTL; `None` holds it until released.
    /// Returns `Ok(None)` when the lock was not obtained in time or `cancel`
    /// fired. A zero `acquire_timeout` never waits.
    async fn acquire(
        &self,
        name: &str,
        lock_timeout: Option<Duration>,
        acquire_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<LockHandle>, LockError>;

    /// Release a lock if this handle still owns it
    ///
    /// Returns whether the lock was removed. Releasing an expired, taken
    /// over or already released lock is a no-op.
    async fn release(&self, lock: &LockHandle) -> bool;

    /// Reset the TTL of a lock this handle still owns
    ///
    /// `false` means ownership was lost and the caller should abandon its
    /// critical section.
    async fn renew(&self, lock: &LockHandle, lock_timeout: Option<Duration>) -> bool;

    /// Whether `name` is currently held; advisory only
    async fn is_locked(&self, name: &str) -> Result<bool, LockError>;
}

pub(crate) fn validate(name: &str, lock_timeout: Option<Duration>) -> Result<(), LockError> {
    if name.is_empty() {
        return Err(LockError::InvalidName);
    }
    if lock_timeout.is_some_and(|ttl| ttl.is_zero()) {
        return Err(LockError::InvalidTimeout);
    }
    Ok(())
}

/// Run `body` while holding `lock`, then release it
///
/// The release happens once `body` finishes, whatever it returned. If the
/// returned future is dropped early the lock is left to its TTL.
pub async fn scoped<P, F>(provider: &P, lock: &LockHandle, body: F) -> F::Output
where
    P: LockProvider,
    F: Future,
{
    let output = body.await;
    if !provider.release(lock).await {
        tracing::warn!(lock = lock.name(), "lock was lost before release");
    }
    output
}

/// Acquire `name` and run `body` with the lock held
///
/// Returns `Ok(None)` without running `body` when the lock was not obtained.
pub async fn try_using<P, F, Fut>(
    provider: &P,
    name: &str,
    lock_timeout: Option<Duration>,
    acquire_timeout: Duration,
    cancel: &CancellationToken,
    body: F,
) -> Result<Option<Fut::Output>, LockError>
where
    P: LockProvider,
    F: FnOnce(LockHandle) -> Fut,
    Fut: Future,
{
    let Some(lock) = provider
        .acquire(name, lock_timeout, acquire_timeout, cancel)
        .await?
    else {
        return Ok(None);
    };
    let output = scoped(provider, &lock, body(lock.clone())).await;
    Ok(Some(output))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
