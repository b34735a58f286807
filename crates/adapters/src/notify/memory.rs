// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process notification channel

use super::{
    ChannelError, Message, NotificationChannel, Subscription, SubscriptionId, TopicPattern,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

type Subscribers = HashMap<SubscriptionId, (TopicPattern, mpsc::UnboundedSender<Message>)>;

/// Routes published messages to every subscriber whose pattern matches
#[derive(Clone, Default)]
pub struct InMemoryNotificationChannel {
    subscribers: Arc<RwLock<Subscribers>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryNotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[async_trait]
impl NotificationChannel for InMemoryNotificationChannel {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ChannelError> {
        let mut closed = Vec::new();
        {
            let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
            for (id, (pattern, tx)) in subs.iter() {
                if !pattern.matches(topic) {
                    continue;
                }
                let message = Message {
                    topic: topic.to_string(),
                    payload: payload.to_string(),
                };
                if tx.send(message).is_err() {
                    closed.push(id.clone());
                }
            }
        }

        // Subscribers dropped without unsubscribing
        if !closed.is_empty() {
            let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            for id in &closed {
                subs.remove(id);
            }
            tracing::debug!(pruned = closed.len(), "pruned closed subscribers");
        }
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> Result<Subscription, ChannelError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let id = SubscriptionId(format!("sub-{n}"));

        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), (TopicPattern::new(pattern), tx));

        Ok(Subscription::new(id, rx))
    }

    async fn unsubscribe(&self, id: &SubscriptionId) -> Result<(), ChannelError> {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
