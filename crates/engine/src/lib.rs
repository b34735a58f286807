// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! latch execution engine: distributed locks and the queue job loop

mod error;
mod job;
pub mod lock;

pub use error::{BoxError, EngineError, LockError};
pub use job::{QueueJob, QueueProcessor, RunSummary};
pub use lock::{scoped, try_using, CacheLockProvider, LockProvider, NoOpLockProvider};
