mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::Notify;
use tokio::time::timeout;

use common::{Recorder, WAIT, gated, sleepy, until};
use taskqueue::{EventKind, QueueConfig, Retention, TaskQueue, TaskStatus};

fn queue(retention: Retention) -> (TaskQueue, Arc<Recorder>) {
    let recorder = Recorder::new();
    let mut cfg = QueueConfig::new(2);
    cfg.retention = retention;
    let queue = TaskQueue::builder(cfg)
        .with_subscriber(recorder.clone())
        .build()
        .unwrap();
    (queue, recorder)
}

#[tokio::test]
async fn finished_tasks_stay_until_cleared() {
    let (queue, recorder) = queue(Retention::UntilCleared);
    let gate = Arc::new(Notify::new());

    queue.submit("done", sleepy(Duration::from_millis(1))).unwrap();
    queue.submit("busy", gated(&gate)).unwrap();
    until(&queue, |s| s.status("done") == Some(TaskStatus::Completed)).await;

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(queue.snapshot().status("done"), Some(TaskStatus::Completed));

    // only finished tasks can be cleared
    queue.clear("busy");
    queue.clear("unknown");
    queue.clear("done");
    recorder.wait_for("done", EventKind::Cleared).await;

    let s = queue.snapshot();
    assert!(s.get("done").is_none());
    assert_eq!(s.status("busy"), Some(TaskStatus::Running));
    assert!(!recorder.states("busy").contains(&EventKind::Cleared));
}

#[tokio::test]
async fn finished_tasks_expire() {
    let (queue, recorder) = queue(Retention::ExpireAfter(Duration::from_millis(40)));

    queue.submit("short-lived", sleepy(Duration::from_millis(1))).unwrap();
    until(&queue, |s| s.status("short-lived") == Some(TaskStatus::Completed)).await;

    recorder.wait_for("short-lived", EventKind::Cleared).await;
    assert!(queue.snapshot().is_empty());
}

#[tokio::test]
async fn expiry_does_not_remove_a_resubmitted_task() {
    let (queue, _recorder) = queue(Retention::ExpireAfter(Duration::from_millis(40)));
    let gate = Arc::new(Notify::new());

    queue.submit("reused", sleepy(Duration::from_millis(1))).unwrap();
    until(&queue, |s| s.status("reused") == Some(TaskStatus::Completed)).await;

    queue.submit("reused", gated(&gate)).unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(queue.snapshot().status("reused"), Some(TaskStatus::Running));

    gate.notify_one();
    until(&queue, |s| s.get("reused").is_none()).await;
}

#[tokio::test]
async fn immediate_retention_publishes_terminal_state_once() {
    let (queue, recorder) = queue(Retention::Immediate);
    let mut updates = queue.observe();

    queue.submit("blink", sleepy(Duration::from_millis(1))).unwrap();

    let mut saw_completed = false;
    timeout(WAIT, async {
        while let Some(s) = updates.next().await {
            match s.status("blink") {
                Some(TaskStatus::Completed) => saw_completed = true,
                None if saw_completed => break,
                _ => {}
            }
        }
    })
    .await
    .expect("terminal snapshot followed by removal");

    recorder.wait_for("blink", EventKind::Cleared).await;
    assert_eq!(
        recorder.states("blink"),
        [
            EventKind::Pending,
            EventKind::Running,
            EventKind::Completed,
            EventKind::Cleared
        ]
    );
}
