// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock handles and holder tokens
//!
//! A [`LockHandle`] is the caller's proof of ownership over a named lock.
//! The store holds `key -> token`; release and renew only succeed while the
//! stored token still equals the handle's token.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Opaque value proving which acquirer currently owns a lock
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderToken(pub String);

impl HolderToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HolderToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A granted lock
#[derive(Clone, Debug)]
pub struct LockHandle {
    name: String,
    token: HolderToken,
    acquired_at: Instant,
    /// `None` means held until explicitly released
    ttl: Option<Duration>,
}

impl LockHandle {
    pub fn new(
        name: impl Into<String>,
        token: HolderToken,
        acquired_at: Instant,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            name: name.into(),
            token,
            acquired_at,
            ttl,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &HolderToken {
        &self.token
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// When the lock lapses unless renewed, measured from acquisition
    pub fn expires_at(&self) -> Option<Instant> {
        self.ttl.and_then(|ttl| self.acquired_at.checked_add(ttl))
    }
}

/// Payload published on a lock's release topic
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotice {
    pub name: String,
    pub token: HolderToken,
}

impl ReleaseNotice {
    pub fn for_lock(lock: &LockHandle) -> Self {
        Self {
            name: lock.name.clone(),
            token: lock.token.clone(),
        }
    }

    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
