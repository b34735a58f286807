// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock provider backed by a key-value store and a notification channel

use super::{validate, LockProvider};
use crate::error::LockError;
use async_trait::async_trait;
use latch_adapters::{KeyValueStore, Message, NotificationChannel, Subscription};
use latch_core::{
    Clock, HolderToken, IdGen, LockConfig, LockHandle, ReleaseNotice, SystemClock, UuidIdGen,
};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a waiting acquirer woke up
enum Wake {
    Cancelled,
    Poll,
    Notified(Option<Message>),
}

/// Locks stored as `key_prefix + name -> holder token` with a TTL
///
/// Waiters subscribe to `topic_prefix + name` and retry on every release
/// notice, falling back to polling every `poll_interval`.
pub struct CacheLockProvider<S, N, C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    store: S,
    channel: N,
    config: LockConfig,
    clock: C,
    tokens: I,
}

impl<S: Clone, N: Clone, C: Clock, I: IdGen> Clone for CacheLockProvider<S, N, C, I> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            channel: self.channel.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<S, N> CacheLockProvider<S, N>
where
    S: KeyValueStore,
    N: NotificationChannel,
{
    pub fn new(store: S, channel: N, config: LockConfig) -> Self {
        Self::with_parts(store, channel, config, SystemClock, UuidIdGen)
    }
}

impl<S, N, C, I> CacheLockProvider<S, N, C, I>
where
    S: KeyValueStore,
    N: NotificationChannel,
    C: Clock,
    I: IdGen,
{
    pub fn with_parts(store: S, channel: N, config: LockConfig, clock: C, tokens: I) -> Self {
        Self {
            store,
            channel,
            config,
            clock,
            tokens,
        }
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// One atomic add attempt; store failures count as "held"
    async fn try_take(
        &self,
        name: &str,
        token: &HolderToken,
        lock_timeout: Option<Duration>,
    ) -> Option<LockHandle> {
        let key = self.config.key_for(name);
        match self.store.try_add(&key, token.as_str(), lock_timeout).await {
            Ok(true) => {
                tracing::debug!(lock = name, holder = %token, "acquired");
                Some(LockHandle::new(name, token.clone(), self.clock.now(), lock_timeout))
            }
            Ok(false) => None,
            Err(e) => {
                tracing::warn!(lock = name, error = %e, "store failed during acquire, treating lock as held");
                None
            }
        }
    }

    async fn wait_for(
        &self,
        name: &str,
        token: &HolderToken,
        lock_timeout: Option<Duration>,
        deadline: Option<Instant>,
        cancel: &CancellationToken,
        subscription: &mut Option<Subscription>,
    ) -> Option<LockHandle> {
        loop {
            // A release may have landed before the subscription existed
            if let Some(lock) = self.try_take(name, token, lock_timeout).await {
                return Some(lock);
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                tracing::debug!(lock = name, "acquire timed out");
                return None;
            }
            let poll_at = [deadline, now.checked_add(self.config.poll_interval)]
                .into_iter()
                .flatten()
                .min();

            let wake = tokio::select! {
                _ = cancel.cancelled() => Wake::Cancelled,
                _ = sleep_until(poll_at) => Wake::Poll,
                message = next_notice(subscription) => Wake::Notified(message),
            };

            match wake {
                Wake::Cancelled => {
                    tracing::debug!(lock = name, "acquire cancelled");
                    return None;
                }
                Wake::Poll => {}
                Wake::Notified(Some(message)) => match ReleaseNotice::from_payload(&message.payload)
                {
                    Ok(notice) => tracing::trace!(lock = name, released_by = %notice.token, "release notice"),
                    Err(e) => tracing::trace!(lock = name, error = %e, "unreadable release notice"),
                },
                Wake::Notified(None) => {
                    tracing::debug!(lock = name, "subscription closed, polling only");
                    *subscription = None;
                }
            }
        }
    }

    async fn publish_release(&self, lock: &LockHandle) {
        let topic = self.config.topic_for(lock.name());
        let payload = match ReleaseNotice::for_lock(lock).to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(lock = lock.name(), error = %e, "failed to encode release notice");
                return;
            }
        };
        if let Err(e) = self.channel.publish(&topic, &payload).await {
            tracing::warn!(lock = lock.name(), error = %e, "failed to publish release notice");
        }
    }
}

/// Sleep until `at`; never resolves for `None`
async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Next message on the subscription; never resolves without one
async fn next_notice(subscription: &mut Option<Subscription>) -> Option<Message> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl<S, N, C, I> LockProvider for CacheLockProvider<S, N, C, I>
where
    S: KeyValueStore,
    N: NotificationChannel,
    C: Clock,
    I: IdGen,
{
    async fn acquire(
        &self,
        name: &str,
        lock_timeout: Option<Duration>,
        acquire_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<LockHandle>, LockError> {
        validate(name, lock_timeout)?;
        let token = HolderToken::new(self.tokens.next());

        if let Some(lock) = self.try_take(name, &token, lock_timeout).await {
            return Ok(Some(lock));
        }
        if acquire_timeout.is_zero() || cancel.is_cancelled() {
            tracing::debug!(lock = name, "lock held, not waiting");
            return Ok(None);
        }

        // `None` when the timeout is too large to represent: wait indefinitely
        let deadline = Instant::now().checked_add(acquire_timeout);
        let topic = self.config.topic_for(name);
        let mut subscription = match self.channel.subscribe(&topic).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!(lock = name, error = %e, "subscribe failed, polling only");
                None
            }
        };

        tracing::debug!(lock = name, wait_ms = acquire_timeout.as_millis() as u64, "waiting for lock");
        let acquired = self
            .wait_for(name, &token, lock_timeout, deadline, cancel, &mut subscription)
            .await;

        if let Some(subscription) = subscription {
            if let Err(e) = self.channel.unsubscribe(&subscription.id).await {
                tracing::debug!(lock = name, error = %e, "unsubscribe failed");
            }
        }
        Ok(acquired)
    }

    async fn release(&self, lock: &LockHandle) -> bool {
        let key = self.config.key_for(lock.name());
        let released = match self.store.compare_and_remove(&key, lock.token().as_str()).await {
            Ok(true) => {
                tracing::debug!(lock = lock.name(), holder = %lock.token(), "released");
                true
            }
            Ok(false) => {
                tracing::debug!(lock = lock.name(), holder = %lock.token(), "not held by this holder");
                false
            }
            Err(e) => {
                tracing::warn!(lock = lock.name(), error = %e, "release failed");
                false
            }
        };

        // Waiters recheck even when nothing was removed
        self.publish_release(lock).await;
        released
    }

    async fn renew(&self, lock: &LockHandle, lock_timeout: Option<Duration>) -> bool {
        if lock_timeout.is_some_and(|ttl| ttl.is_zero()) {
            tracing::warn!(lock = lock.name(), "refusing to renew with a zero timeout");
            return false;
        }
        let key = self.config.key_for(lock.name());
        match self
            .store
            .try_update_expiry(&key, lock.token().as_str(), lock_timeout)
            .await
        {
            Ok(renewed) => {
                if !renewed {
                    tracing::warn!(lock = lock.name(), holder = %lock.token(), "renew failed, lock lost");
                }
                renewed
            }
            Err(e) => {
                tracing::warn!(lock = lock.name(), error = %e, "renew failed");
                false
            }
        }
    }

    async fn is_locked(&self, name: &str) -> Result<bool, LockError> {
        validate(name, None)?;
        Ok(self.store.exists(&self.config.key_for(name)).await?)
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
