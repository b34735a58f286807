// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `latch contend` - Several tasks contending for one lock

use super::drain::cancel_on_ctrl_c;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use clap::Args;
use latch_adapters::{InMemoryKeyValueStore, InMemoryNotificationChannel, TracedKeyValueStore};
use latch_core::LatchConfig;
use latch_engine::{try_using, CacheLockProvider};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

const WAIT_SLACK: Duration = Duration::from_secs(5);

#[derive(Args)]
pub struct ContendArgs {
    /// Number of contending tasks
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..))]
    pub workers: u64,

    /// How long each task holds the lock, in milliseconds
    #[arg(long, default_value_t = 10)]
    pub hold_ms: u64,

    /// Lock name
    #[arg(long, default_value = "contended")]
    pub name: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ContendReport {
    name: String,
    workers: u64,
    /// Workers in the order they entered the lock
    order: Vec<u64>,
    missed: u64,
    overlap: bool,
}

impl fmt::Display for ContendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order: Vec<String> = self.order.iter().map(u64::to_string).collect();
        writeln!(f, "lock: {}", self.name)?;
        writeln!(f, "acquired: {}/{}", self.order.len(), self.workers)?;
        writeln!(f, "order: {}", order.join(" "))?;
        write!(
            f,
            "overlap: {}",
            if self.overlap { "detected" } else { "none" }
        )
    }
}

/// Tracks how many workers are inside the lock at once
#[derive(Default)]
struct Occupancy {
    inside: AtomicUsize,
    overlap: AtomicBool,
    order: Mutex<Vec<u64>>,
}

impl Occupancy {
    fn enter(&self, worker: u64) {
        if self.inside.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlap.store(true, Ordering::SeqCst);
        }
        self.order
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(worker);
    }

    fn leave(&self) {
        self.inside.fetch_sub(1, Ordering::SeqCst);
    }
}

pub async fn contend(args: ContendArgs, config: &LatchConfig) -> Result<()> {
    let locks = CacheLockProvider::new(
        TracedKeyValueStore::new(InMemoryKeyValueStore::new()),
        InMemoryNotificationChannel::new(),
        config.lock.clone(),
    );
    let hold = Duration::from_millis(args.hold_ms);
    let ttl = config.job.entry_lock_timeout;
    // Long enough for every other worker to take a turn
    let wait = hold
        .saturating_mul(u32::try_from(args.workers).unwrap_or(u32::MAX))
        .saturating_add(config.lock.poll_interval)
        .saturating_add(WAIT_SLACK);

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);
    let occupancy = Arc::new(Occupancy::default());

    let mut handles = Vec::new();
    for worker in 0..args.workers {
        let locks = locks.clone();
        let name = args.name.clone();
        let cancel = cancel.clone();
        let occupancy = Arc::clone(&occupancy);
        let span = tracing::info_span!("contender", worker);
        handles.push(tokio::spawn(
            async move {
                try_using(&locks, &name, Some(ttl), wait, &cancel, |_lock| async move {
                    occupancy.enter(worker);
                    tokio::time::sleep(hold).await;
                    occupancy.leave();
                })
                .await
            }
            .instrument(span),
        ));
    }

    let mut missed = 0;
    for handle in handles {
        if handle.await.context("contender task failed")??.is_none() {
            missed += 1;
        }
    }

    let order = occupancy
        .order
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    let report = ContendReport {
        name: args.name,
        workers: args.workers,
        order,
        missed,
        overlap: occupancy.overlap.load(Ordering::SeqCst),
    };
    output::print(&report, args.format)?;

    if report.overlap {
        bail!("lock {} was held by more than one task", report.name);
    }
    Ok(())
}

#[cfg(test)]
#[path = "contend_tests.rs"]
mod tests;
