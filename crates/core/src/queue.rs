// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue entries and lease bookkeeping
//!
//! [`QueueState`] is the pure, clock-driven core of an at-least-once queue:
//! FIFO availability, leases with a visibility timeout, retries and a
//! dead-letter list. Leased entries that are not resolved before their
//! visibility timeout are returned to the queue by [`QueueState::reclaim_expired`].

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Identity assigned to an entry at enqueue time
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one dequeue of an entry
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaseId(pub String);

impl LeaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for LeaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A leased entry handed to a consumer
///
/// Clones share the resolved flag, so whichever copy is completed or
/// abandoned first is visible to all of them.
#[derive(Clone, Debug)]
pub struct QueueEntry<T> {
    pub id: EntryId,
    pub lease_id: LeaseId,
    pub payload: T,
    /// Number of times this entry has been dequeued, including this lease
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
    pub dequeued_at: DateTime<Utc>,
    resolved: Arc<AtomicBool>,
}

impl<T> QueueEntry<T> {
    pub fn new(
        id: EntryId,
        lease_id: LeaseId,
        payload: T,
        attempts: u32,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            lease_id,
            payload,
            attempts,
            enqueued_at,
            dequeued_at: Utc::now(),
            resolved: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether this lease has been completed or abandoned
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }

    /// Flag the lease as resolved; returns false if it already was
    pub fn mark_resolved(&self) -> bool {
        !self.resolved.swap(true, Ordering::SeqCst)
    }
}

/// Point-in-time queue counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Entries available for dequeue
    pub queued: usize,
    /// Entries currently leased
    pub working: usize,
    pub dead_lettered: usize,
    pub enqueued: u64,
    pub dequeued: u64,
    pub completed: u64,
    pub abandoned: u64,
    /// Leases that hit their visibility timeout
    pub timeouts: u64,
}

impl QueueStats {
    /// Work that is either waiting or in flight
    pub fn outstanding(&self) -> usize {
        self.queued + self.working
    }
}

/// An entry that exhausted its retries
#[derive(Clone, Debug)]
pub struct DeadLetter<T> {
    pub id: EntryId,
    pub payload: T,
    pub attempts: u32,
    pub reason: String,
    pub dead_at: DateTime<Utc>,
}

/// What happened to an abandoned lease
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Abandoned {
    Requeued { attempts: u32 },
    DeadLettered { attempts: u32 },
}

/// Errors resolving a lease
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeaseError {
    /// Unknown lease, already resolved, or reclaimed after its visibility timeout
    #[error("lease not found: {0}")]
    NotFound(LeaseId),
}

#[derive(Clone, Debug)]
struct Stored<T> {
    id: EntryId,
    payload: T,
    attempts: u32,
    enqueued_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
struct Lease<T> {
    entry: QueueEntry<T>,
    /// `None` when the visibility timeout is too large to ever elapse
    visible_after: Option<Instant>,
}

/// In-process queue state
#[derive(Clone, Debug)]
pub struct QueueState<T> {
    available: VecDeque<Stored<T>>,
    leased: HashMap<LeaseId, Lease<T>>,
    dead_letters: Vec<DeadLetter<T>>,
    /// Abandons tolerated before an entry is dead-lettered
    retries: u32,
    enqueued: u64,
    dequeued: u64,
    completed: u64,
    abandoned: u64,
    timeouts: u64,
}

impl<T: Clone> QueueState<T> {
    pub fn new(retries: u32) -> Self {
        Self {
            available: VecDeque::new(),
            leased: HashMap::new(),
            dead_letters: Vec::new(),
            retries,
            enqueued: 0,
            dequeued: 0,
            completed: 0,
            abandoned: 0,
            timeouts: 0,
        }
    }

    /// Add a new entry at the back of the queue
    pub fn push(&mut self, id: EntryId, payload: T) {
        self.enqueued += 1;
        self.available.push_back(Stored {
            id,
            payload,
            attempts: 0,
            enqueued_at: Utc::now(),
        });
    }

    /// Lease the next available entry, hiding it for `visibility`
    pub fn lease(
        &mut self,
        lease_id: LeaseId,
        visibility: Duration,
        clock: &impl Clock,
    ) -> Option<QueueEntry<T>> {
        let stored = self.available.pop_front()?;
        let entry = QueueEntry::new(
            stored.id,
            lease_id.clone(),
            stored.payload,
            stored.attempts + 1,
            stored.enqueued_at,
        );

        self.dequeued += 1;
        self.leased.insert(
            lease_id,
            Lease {
                entry: entry.clone(),
                visible_after: clock.deadline(Some(visibility)),
            },
        );
        Some(entry)
    }

    /// Complete a lease, removing its entry from the queue
    pub fn complete(&mut self, lease_id: &LeaseId) -> Result<(), LeaseError> {
        let lease = self
            .leased
            .remove(lease_id)
            .ok_or_else(|| LeaseError::NotFound(lease_id.clone()))?;
        lease.entry.mark_resolved();
        self.completed += 1;
        Ok(())
    }

    /// Return a lease to the queue, or dead-letter it once retries are spent
    pub fn abandon(&mut self, lease_id: &LeaseId, reason: &str) -> Result<Abandoned, LeaseError> {
        let lease = self
            .leased
            .remove(lease_id)
            .ok_or_else(|| LeaseError::NotFound(lease_id.clone()))?;
        lease.entry.mark_resolved();
        self.abandoned += 1;
        Ok(self.requeue_or_bury(lease.entry, reason))
    }

    /// Return leases past their visibility timeout to the queue
    pub fn reclaim_expired(&mut self, clock: &impl Clock) -> Vec<EntryId> {
        let expired: Vec<LeaseId> = self
            .leased
            .iter()
            .filter(|(_, lease)| clock.has_passed(lease.visible_after))
            .map(|(id, _)| id.clone())
            .collect();

        let mut reclaimed = Vec::with_capacity(expired.len());
        for lease_id in expired {
            if let Some(lease) = self.leased.remove(&lease_id) {
                self.timeouts += 1;
                reclaimed.push(lease.entry.id.clone());
                self.requeue_or_bury(lease.entry, "visibility timeout elapsed");
            }
        }
        reclaimed
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            queued: self.available.len(),
            working: self.leased.len(),
            dead_lettered: self.dead_letters.len(),
            enqueued: self.enqueued,
            dequeued: self.dequeued,
            completed: self.completed,
            abandoned: self.abandoned,
            timeouts: self.timeouts,
        }
    }

    pub fn dead_letters(&self) -> &[DeadLetter<T>] {
        &self.dead_letters
    }

    fn requeue_or_bury(&mut self, entry: QueueEntry<T>, reason: &str) -> Abandoned {
        let attempts = entry.attempts;
        if attempts > self.retries {
            self.dead_letters.push(DeadLetter {
                id: entry.id,
                payload: entry.payload,
                attempts,
                reason: reason.to_string(),
                dead_at: Utc::now(),
            });
            Abandoned::DeadLettered { attempts }
        } else {
            self.available.push_back(Stored {
                id: entry.id,
                payload: entry.payload,
                attempts,
                enqueued_at: entry.enqueued_at,
            });
            Abandoned::Requeued { attempts }
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
