// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::kv::FailingKeyValueStore;
use crate::queue::{FakeQueue, QueueCall};
use latch_core::QueueConfig;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_store_try_add_logs_span_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedKeyValueStore::new(FailingKeyValueStore::new());
        traced.try_add("lock:orders", "token", None).await
    });

    assert!(result.unwrap());
    assert!(logs.contains("kv.try_add"), "Should log span name. Logs:\n{logs}");
    assert!(logs.contains("lock:orders"), "Should log key. Logs:\n{logs}");
    assert!(logs.contains("added=true"), "Should log outcome. Logs:\n{logs}");
    assert!(logs.contains("elapsed_ms"), "Should log timing. Logs:\n{logs}");
}

#[test]
fn traced_store_logs_failures() {
    let (logs, result) = with_tracing(|| async {
        let inner = FailingKeyValueStore::new();
        inner.set_failing(true);
        let traced = TracedKeyValueStore::new(inner);
        traced.compare_and_remove("lock:orders", "token").await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("compare_and_remove failed"),
        "Should log failure. Logs:\n{logs}"
    );
    assert!(
        logs.contains("injected failure"),
        "Should log cause. Logs:\n{logs}"
    );
}

#[test]
fn traced_queue_logs_dequeue_and_complete() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedQueue::new(FakeQueue::new(QueueConfig::default()));
        traced.enqueue("job".to_string()).await.unwrap();
        let entry = traced
            .dequeue(Duration::ZERO, &CancellationToken::new())
            .await
            .unwrap();
        traced.complete(&entry).await
    });

    assert!(result.is_ok());
    assert!(logs.contains("queue.dequeue"), "Should log dequeue span. Logs:\n{logs}");
    assert!(logs.contains("attempts=1"), "Should log attempts. Logs:\n{logs}");
    assert!(logs.contains("queue.complete"), "Should log complete span. Logs:\n{logs}");
    assert!(logs.contains("completed"), "Should log completion. Logs:\n{logs}");
}

#[test]
fn traced_queue_empty_dequeue_is_not_an_error() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedQueue::new(FakeQueue::<String>::new(QueueConfig::default()));
        traced
            .dequeue(Duration::ZERO, &CancellationToken::new())
            .await
    });

    assert!(matches!(result, Err(QueueError::Timeout)));
    assert!(logs.contains("nothing dequeued"), "Logs:\n{logs}");
    assert!(!logs.contains("dequeue failed"), "Logs:\n{logs}");
}

// =============================================================================
// Delegation tests - verify traced wrapper delegates to inner adapter
// =============================================================================

#[tokio::test]
async fn traced_store_delegates_to_inner() {
    let fake = FailingKeyValueStore::new();
    let traced = TracedKeyValueStore::new(fake.clone());

    traced.try_add("k", "v", None).await.unwrap();
    traced
        .try_update_expiry("k", "v", Some(Duration::from_secs(1)))
        .await
        .unwrap();
    assert_eq!(traced.increment("n", 3, None).await.unwrap(), 3);

    assert_eq!(fake.count("try_add"), 1);
    assert_eq!(fake.count("try_update_expiry"), 1);
    assert_eq!(fake.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn traced_queue_delegates_abandon_to_inner() {
    let fake = FakeQueue::new(QueueConfig::default());
    let traced = TracedQueue::new(fake.clone());
    let id = traced.enqueue(5u32).await.unwrap();
    let entry = traced
        .dequeue(Duration::ZERO, &CancellationToken::new())
        .await
        .unwrap();

    traced.abandon(&entry).await.unwrap();

    assert_eq!(fake.resolutions(), vec![QueueCall::Abandon { entry: id }]);
    assert_eq!(traced.queue_count().await.unwrap(), 1);
}
