// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn queue() -> FakeQueue<u32> {
    FakeQueue::new(QueueConfig::default())
}

#[tokio::test(start_paused = true)]
async fn records_each_call() {
    let queue = queue();
    let id = queue.enqueue(7).await.unwrap();
    let entry = queue
        .dequeue(Duration::ZERO, &CancellationToken::new())
        .await
        .unwrap();
    queue.complete(&entry).await.unwrap();

    assert_eq!(
        queue.calls(),
        vec![
            QueueCall::Enqueue { entry: id.clone() },
            QueueCall::Dequeue {
                entry: Some(id.clone())
            },
            QueueCall::Complete { entry: id },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn empty_dequeue_records_none() {
    let queue = queue();
    let result = queue
        .dequeue(Duration::ZERO, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(QueueError::Timeout)));
    assert_eq!(queue.calls(), vec![QueueCall::Dequeue { entry: None }]);
}

#[tokio::test(start_paused = true)]
async fn injected_resolution_failure_keeps_lease() {
    let queue = queue();
    queue.enqueue(1).await.unwrap();
    let entry = queue
        .dequeue(Duration::ZERO, &CancellationToken::new())
        .await
        .unwrap();

    queue.set_failing_resolution(true);
    assert!(queue.abandon(&entry).await.is_err());

    assert!(!entry.is_resolved());
    assert_eq!(queue.working_count().await.unwrap(), 1);
    assert_eq!(queue.resolutions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn injected_dequeue_failure_is_not_a_timeout() {
    let queue = queue();
    queue.enqueue(1).await.unwrap();
    queue.set_failing_dequeue(true);

    let err = queue
        .dequeue(Duration::ZERO, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(!err.is_timeout());
    assert_eq!(queue.queue_count().await.unwrap(), 1);
}
