// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue job engine
//!
//! Each iteration leases one entry, optionally takes a per-entry lock,
//! hands the entry to a [`QueueProcessor`] and then completes or abandons
//! it. The per-entry lock is released before the entry is resolved.

use crate::error::{BoxError, EngineError};
use crate::lock::{scoped, LockProvider, NoOpLockProvider};
use async_trait::async_trait;
use latch_adapters::{Queue, QueueError};
use latch_core::{JobConfig, JobResult, QueueEntry};
use serde::Serialize;
use std::future::Future;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Caller-supplied processing logic
#[async_trait]
pub trait QueueProcessor<T: Send + Sync + 'static>: Send + Sync + 'static {
    /// Process one leased entry
    ///
    /// `Ok(JobResult::Failed)` is an expected, per-entry failure: the entry
    /// is abandoned and the run continues. `Err` is unexpected: the entry is
    /// abandoned and the error halts the run.
    async fn process(
        &self,
        entry: &QueueEntry<T>,
        cancel: &CancellationToken,
    ) -> Result<JobResult, BoxError>;

    /// Name of the lock guarding this entry; `None` processes without one
    fn lock_name(&self, entry: &QueueEntry<T>) -> Option<String> {
        let _ = entry;
        None
    }
}

/// Tally of a continuous run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub iterations: u64,
    /// Entries handed to the processor or abandoned before it
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub dequeue_failures: u64,
}

impl RunSummary {
    fn record(&mut self, result: &JobResult) {
        self.processed += 1;
        match result {
            JobResult::Success { .. } => self.succeeded += 1,
            JobResult::Failed { .. } => self.failed += 1,
            JobResult::Cancelled => self.cancelled += 1,
        }
    }
}

impl std::ops::AddAssign for RunSummary {
    fn add_assign(&mut self, other: Self) {
        self.iterations += other.iterations;
        self.processed += other.processed;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.cancelled += other.cancelled;
        self.dequeue_failures += other.dequeue_failures;
    }
}

/// Outcome of one iteration
enum Iteration {
    /// Nothing was leased; the result says whether that was benign
    Idle(JobResult),
    Processed(JobResult),
}

#[derive(Clone, Copy, Debug)]
enum Resolution {
    Complete,
    Abandon,
}

/// Consume-lock-process-resolve loop over a queue
pub struct QueueJob<T, Q, P, L = NoOpLockProvider> {
    queue: Q,
    processor: P,
    locks: L,
    config: JobConfig,
    _payload: PhantomData<fn() -> T>,
}

impl<T, Q, P> QueueJob<T, Q, P, NoOpLockProvider>
where
    T: Send + Sync + 'static,
    Q: Queue<T>,
    P: QueueProcessor<T>,
{
    pub fn new(queue: Q, processor: P, config: JobConfig) -> Self {
        Self {
            queue,
            processor,
            locks: NoOpLockProvider,
            config,
            _payload: PhantomData,
        }
    }
}

impl<T, Q, P, L> QueueJob<T, Q, P, L>
where
    T: Send + Sync + 'static,
    Q: Queue<T>,
    P: QueueProcessor<T>,
    L: LockProvider,
{
    /// Guard entries named by [`QueueProcessor::lock_name`] with `locks`
    pub fn with_locks<L2: LockProvider>(self, locks: L2) -> QueueJob<T, Q, P, L2> {
        QueueJob {
            queue: self.queue,
            processor: self.processor,
            locks,
            config: self.config,
            _payload: PhantomData,
        }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Process at most one entry
    ///
    /// An empty queue is a successful, empty iteration. A dequeue failure is
    /// reported as `Failed` without touching any entry.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<JobResult, EngineError> {
        match self.iterate(cancel).await? {
            Iteration::Idle(result) | Iteration::Processed(result) => Ok(result),
        }
    }

    /// Run iterations until `continuation` says stop or `cancel` fires
    ///
    /// After an iteration that leased nothing the loop sleeps `idle_delay`.
    /// Cancellation is checked between iterations and during that sleep;
    /// an entry already being processed is always finished and resolved.
    pub async fn run_continuously<F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut continuation: F,
        idle_delay: Duration,
    ) -> Result<RunSummary, EngineError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = bool> + Send,
    {
        let mut summary = RunSummary::default();

        while !cancel.is_cancelled() {
            summary.iterations += 1;
            match self.iterate(cancel).await? {
                Iteration::Processed(result) => summary.record(&result),
                Iteration::Idle(result) => {
                    if result.is_failed() {
                        summary.dequeue_failures += 1;
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(idle_delay) => {}
                    }
                }
            }

            if cancel.is_cancelled() || !continuation().await {
                break;
            }
        }

        tracing::info!(
            iterations = summary.iterations,
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = cancel.is_cancelled(),
            "run finished"
        );
        Ok(summary)
    }

    /// Run until nothing is queued or in flight
    ///
    /// Outstanding work is sampled once per iteration, so entries enqueued
    /// concurrently are drained only if they are visible at a sample.
    /// Entries leased by other workers keep this loop alive until they are
    /// resolved. A failure reading queue statistics stops the loop.
    pub async fn run_until_empty(
        &self,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, EngineError> {
        let queue = self.queue.clone();
        let outstanding = move || {
            let queue = queue.clone();
            async move {
                match queue.stats().await {
                    Ok(stats) => stats.outstanding() > 0,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read queue stats, stopping");
                        false
                    }
                }
            }
        };
        self.run_continuously(cancel, outstanding, self.config.idle_delay)
            .await
    }

    async fn iterate(&self, cancel: &CancellationToken) -> Result<Iteration, EngineError> {
        let entry = match self.queue.dequeue(self.config.dequeue_timeout, cancel).await {
            Ok(entry) => entry,
            Err(e) if e.is_timeout() => {
                tracing::trace!(reason = %e, "no work available");
                return Ok(Iteration::Idle(JobResult::success()));
            }
            Err(e) => {
                tracing::error!(error = %e, "dequeue failed");
                return Ok(Iteration::Idle(JobResult::failed_with("dequeue failed", e)));
            }
        };

        let span = tracing::info_span!("job.entry", entry = %entry.id, attempts = entry.attempts);
        let result = self.handle(&entry, cancel).instrument(span).await?;
        Ok(Iteration::Processed(result))
    }

    async fn handle(
        &self,
        entry: &QueueEntry<T>,
        cancel: &CancellationToken,
    ) -> Result<JobResult, EngineError> {
        if cancel.is_cancelled() {
            tracing::info!("cancelled after dequeue, abandoning");
            self.resolve(entry, Resolution::Abandon).await?;
            return Ok(JobResult::Cancelled);
        }

        let lock = match self.processor.lock_name(entry) {
            None => None,
            Some(name) => {
                let acquired = self
                    .locks
                    .acquire(
                        &name,
                        Some(self.config.entry_lock_timeout),
                        self.config.entry_lock_wait,
                        cancel,
                    )
                    .await;
                match acquired {
                    Ok(Some(lock)) => Some(lock),
                    Ok(None) => {
                        tracing::warn!(lock = %name, "entry lock unavailable, abandoning");
                        self.resolve(entry, Resolution::Abandon).await?;
                        return Ok(JobResult::failed(format!(
                            "unable to acquire lock {name}"
                        )));
                    }
                    Err(e) => {
                        tracing::error!(lock = %name, error = %e, "invalid entry lock, abandoning");
                        self.resolve(entry, Resolution::Abandon).await?;
                        return Ok(JobResult::failed_with(
                            format!("unable to acquire lock {name}"),
                            e,
                        ));
                    }
                }
            }
        };

        let start = Instant::now();
        let outcome = match &lock {
            Some(lock) => scoped(&self.locks, lock, self.processor.process(entry, cancel)).await,
            None => self.processor.process(entry, cancel).await,
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                tracing::info!(%result, elapsed_ms, "processed");
                if self.config.auto_complete && !entry.is_resolved() {
                    let resolution = if result.is_success() {
                        Resolution::Complete
                    } else {
                        Resolution::Abandon
                    };
                    self.resolve(entry, resolution).await?;
                }
                Ok(result)
            }
            Err(source) => {
                tracing::error!(error = %source, elapsed_ms, "processing raised, abandoning");
                if !entry.is_resolved() {
                    if let Err(e) = self.resolve(entry, Resolution::Abandon).await {
                        tracing::error!(error = %e, "abandon after processing error failed");
                    }
                }
                Err(EngineError::Processing {
                    entry: entry.id.clone(),
                    source,
                })
            }
        }
    }

    async fn resolve(
        &self,
        entry: &QueueEntry<T>,
        resolution: Resolution,
    ) -> Result<(), EngineError> {
        let result = match resolution {
            Resolution::Complete => self.queue.complete(entry).await,
            Resolution::Abandon => self.queue.abandon(entry).await,
        };
        match result {
            Ok(()) => {
                tracing::debug!(?resolution, "resolved");
                Ok(())
            }
            // Lease expired mid-processing; the queue already took the entry back
            Err(QueueError::LeaseNotFound(lease)) => {
                tracing::warn!(%lease, ?resolution, "lease no longer held, entry will be redelivered");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
