// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording notification channel for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    ChannelError, InMemoryNotificationChannel, Message, NotificationChannel, Subscription,
    SubscriptionId,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory channel that records every publish and can lose or refuse traffic
#[derive(Clone, Default)]
pub struct RecordingChannel {
    inner: InMemoryNotificationChannel,
    published: Arc<Mutex<Vec<Message>>>,
    dropping: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record publishes without delivering them
    pub fn set_dropping(&self, dropping: bool) {
        self.dropping.store(dropping, Ordering::SeqCst);
    }

    /// Fail every publish and subscribe
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all recorded publishes, delivered or not
    pub fn published(&self) -> Vec<Message> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    fn check(&self) -> Result<(), ChannelError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ChannelError> {
        self.published
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Message {
                topic: topic.to_string(),
                payload: payload.to_string(),
            });
        self.check()?;
        if self.dropping.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.publish(topic, payload).await
    }

    async fn subscribe(&self, pattern: &str) -> Result<Subscription, ChannelError> {
        self.check()?;
        self.inner.subscribe(pattern).await
    }

    async fn unsubscribe(&self, id: &SubscriptionId) -> Result<(), ChannelError> {
        self.inner.unsubscribe(id).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
