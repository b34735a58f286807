// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Collaborators for locks and queue jobs
//!
//! Each collaborator is a trait with an in-process implementation:
//! - [`KeyValueStore`]: atomic add, compare-and-remove and expiry
//! - [`NotificationChannel`]: best-effort topic publish/subscribe
//! - [`Queue`]: at-least-once leased delivery

pub mod kv;
pub mod notify;
pub mod queue;
pub mod traced;

pub use kv::{InMemoryKeyValueStore, KeyValueStore, StoreError};
pub use notify::{
    ChannelError, InMemoryNotificationChannel, Message, NotificationChannel, Subscription,
    SubscriptionId, TopicPattern,
};
pub use queue::{InMemoryQueue, Queue, QueueError};
pub use traced::{TracedKeyValueStore, TracedQueue};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use kv::{FailingKeyValueStore, StoreCall};
#[cfg(any(test, feature = "test-support"))]
pub use notify::RecordingChannel;
#[cfg(any(test, feature = "test-support"))]
pub use queue::{FakeQueue, QueueCall};
