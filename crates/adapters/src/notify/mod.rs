// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification channel adapters

mod memory;
mod pattern;

pub use memory::InMemoryNotificationChannel;
pub use pattern::TopicPattern;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::RecordingChannel;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from notification operations
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel unavailable: {0}")]
    Unavailable(String),
}

/// Subscription handle for unsubscribing
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub String);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message delivered to a subscriber
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

/// Live subscription; messages published after `subscribe` returned arrive here
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Subscription {
    pub fn new(id: SubscriptionId, receiver: mpsc::UnboundedReceiver<Message>) -> Self {
        Self { id, receiver }
    }

    /// Wait for the next message; `None` once the channel has dropped us
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }
}

/// Best-effort publish/subscribe keyed by topic
///
/// Delivery is not guaranteed: a message may be lost, so consumers that
/// wait on one must also poll.
#[async_trait]
pub trait NotificationChannel: Clone + Send + Sync + 'static {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ChannelError>;

    /// Subscribe to topics matching `pattern` (see [`TopicPattern`])
    async fn subscribe(&self, pattern: &str) -> Result<Subscription, ChannelError>;

    async fn unsubscribe(&self, id: &SubscriptionId) -> Result<(), ChannelError>;
}
