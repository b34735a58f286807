// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `latch drain` - Drain an in-memory queue with concurrent workers

use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use latch_adapters::{
    InMemoryKeyValueStore, InMemoryNotificationChannel, InMemoryQueue, Queue, TracedKeyValueStore,
    TracedQueue,
};
use latch_core::{JobResult, LatchConfig, QueueEntry};
use latch_engine::{BoxError, CacheLockProvider, QueueJob, QueueProcessor, RunSummary};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

#[derive(Args)]
pub struct DrainArgs {
    /// Number of entries to enqueue
    #[arg(long, default_value_t = 10)]
    pub items: u64,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    pub workers: u64,

    /// Fail the first attempt of every K-th entry
    #[arg(long, value_name = "K", value_parser = clap::value_parser!(u64).range(1..))]
    pub fail_every: Option<u64>,

    /// Fail every attempt of every K-th entry, until it is dead-lettered
    #[arg(long, value_name = "K", value_parser = clap::value_parser!(u64).range(1..))]
    pub poison_every: Option<u64>,

    /// Guard each entry with a distributed lock
    #[arg(long)]
    pub lock_entries: bool,

    /// Simulated processing time per entry, in milliseconds
    #[arg(long, default_value_t = 1)]
    pub work_ms: u64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Debug)]
struct DemoItem {
    index: u64,
}

#[derive(Clone)]
struct DemoProcessor {
    fail_every: Option<u64>,
    poison_every: Option<u64>,
    lock_entries: bool,
    work: Duration,
}

fn every(k: Option<u64>, index: u64) -> bool {
    k.is_some_and(|k| index % k == 0)
}

#[async_trait]
impl QueueProcessor<DemoItem> for DemoProcessor {
    async fn process(
        &self,
        entry: &QueueEntry<DemoItem>,
        cancel: &CancellationToken,
    ) -> Result<JobResult, BoxError> {
        let index = entry.payload.index;
        tokio::select! {
            _ = cancel.cancelled() => return Ok(JobResult::Cancelled),
            _ = tokio::time::sleep(self.work) => {}
        }

        if every(self.poison_every, index) {
            return Ok(JobResult::failed(format!("item {index} is poisoned")));
        }
        if every(self.fail_every, index) && entry.attempts == 1 {
            return Ok(JobResult::failed(format!("item {index} failed its first attempt")));
        }
        Ok(JobResult::success_with(format!("item {index}")))
    }

    fn lock_name(&self, entry: &QueueEntry<DemoItem>) -> Option<String> {
        self.lock_entries
            .then(|| format!("item-{}", entry.payload.index))
    }
}

#[derive(Debug, Serialize)]
struct DrainReport {
    items: u64,
    workers: u64,
    processed: u64,
    succeeded: u64,
    failed: u64,
    completed: u64,
    abandoned: u64,
    dead_lettered: usize,
    queued: usize,
    working: usize,
    cancelled: bool,
}

impl fmt::Display for DrainReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "items: {}", self.items)?;
        writeln!(f, "workers: {}", self.workers)?;
        writeln!(f, "processed: {}", self.processed)?;
        writeln!(f, "completed: {}", self.completed)?;
        writeln!(f, "abandoned: {}", self.abandoned)?;
        writeln!(f, "dead_lettered: {}", self.dead_lettered)?;
        writeln!(f, "queued: {}", self.queued)?;
        write!(f, "working: {}", self.working)?;
        if self.cancelled {
            write!(f, "\ncancelled")?;
        }
        Ok(())
    }
}

pub async fn drain(args: DrainArgs, config: &LatchConfig) -> Result<()> {
    let queue = InMemoryQueue::new(config.queue.clone());
    for index in 1..=args.items {
        queue.enqueue(DemoItem { index }).await?;
    }

    let locks = CacheLockProvider::new(
        TracedKeyValueStore::new(InMemoryKeyValueStore::new()),
        InMemoryNotificationChannel::new(),
        config.lock.clone(),
    );
    let processor = DemoProcessor {
        fail_every: args.fail_every,
        poison_every: args.poison_every,
        lock_entries: args.lock_entries,
        work: Duration::from_millis(args.work_ms),
    };

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    let mut handles = Vec::new();
    for worker in 0..args.workers {
        let job = QueueJob::new(
            TracedQueue::new(queue.clone()),
            processor.clone(),
            config.job.clone(),
        )
        .with_locks(locks.clone());
        let cancel = cancel.clone();
        let span = tracing::info_span!("worker", worker);
        handles.push(tokio::spawn(
            async move { job.run_until_empty(&cancel).await }.instrument(span),
        ));
    }

    let mut total = RunSummary::default();
    for handle in handles {
        match handle.await.context("worker task failed")? {
            Ok(summary) => total += summary,
            Err(e) => {
                cancel.cancel();
                return Err(e).context("worker stopped");
            }
        }
    }

    let stats = queue.stats().await?;
    let report = DrainReport {
        items: args.items,
        workers: args.workers,
        processed: total.processed,
        succeeded: total.succeeded,
        failed: total.failed,
        completed: stats.completed,
        abandoned: stats.abandoned,
        dead_lettered: stats.dead_lettered,
        queued: stats.queued,
        working: stats.working,
        cancelled: cancel.is_cancelled(),
    };
    output::print(&report, args.format)
}

/// Cancel `cancel` on the first Ctrl-C
pub fn cancel_on_ctrl_c(cancel: &CancellationToken) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, finishing in-flight work");
            cancel.cancel();
        }
    });
}

#[cfg(test)]
#[path = "drain_tests.rs"]
mod tests;
