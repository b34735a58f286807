// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! latch-core: Core types for the latch coordination toolkit
//!
//! This crate provides:
//! - Clock and ID abstractions for testable time and identity
//! - Lock handles and holder tokens
//! - Queue entries, lease identity and queue statistics
//! - Job outcomes
//! - TOML configuration with humantime durations

pub mod clock;
pub mod config;
pub mod id;
pub mod job;
pub mod lock;
pub mod queue;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, JobConfig, LatchConfig, LockConfig, QueueConfig};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::{JobResult, SharedError};
pub use lock::{HolderToken, LockHandle, ReleaseNotice};
pub use queue::{
    Abandoned, DeadLetter, EntryId, LeaseError, LeaseId, QueueEntry, QueueState, QueueStats,
};
