mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::timeout;

use common::{Recorder, WAIT, gated};
use taskqueue::{
    EventKind, QueueConfig, QueueError, RuntimeError, TaskContext, TaskError, TaskId, TaskQueue,
    WorkFn,
};

#[tokio::test]
async fn shutdown_cancels_everything_and_closes_submission() {
    let recorder = Recorder::new();
    let queue = TaskQueue::builder(QueueConfig::new(1))
        .with_subscriber(recorder.clone())
        .build()
        .unwrap();
    let gate = Arc::new(Notify::new());

    queue.submit("running", gated(&gate)).unwrap();
    queue.submit("queued", gated(&gate)).unwrap();
    recorder.wait_for("running", EventKind::Running).await;

    timeout(WAIT, queue.shutdown())
        .await
        .expect("shutdown within test deadline")
        .expect("work exits within grace");

    assert_eq!(queue.submit("late", gated(&gate)), Err(QueueError::Closed));
    assert_eq!((queue.running(), queue.pending()), (0, 0));

    recorder.wait_for("running", EventKind::Cancelled).await;
    recorder.wait_for("queued", EventKind::Cancelled).await;
    assert_eq!(
        recorder.states("queued"),
        [EventKind::Pending, EventKind::Cancelled]
    );

    // second call is a no-op
    queue.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_reports_work_that_outlives_grace() {
    let mut cfg = QueueConfig::new(1);
    cfg.grace = Duration::from_millis(20);
    let queue = TaskQueue::new(cfg).unwrap();
    let started = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&started);
    queue
        .submit(
            "stuck",
            WorkFn::arc(move |_ctx: TaskContext| {
                let flag = Arc::clone(&flag);
                async move {
                    flag.store(true, Ordering::SeqCst);
                    // blocks the worker thread; cancellation cannot reach it
                    std::thread::sleep(Duration::from_millis(300));
                    Ok::<(), TaskError>(())
                }
            }),
        )
        .unwrap();

    timeout(WAIT, async {
        while !started.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .unwrap();

    let err = queue.shutdown().await.unwrap_err();
    assert_eq!(err.as_label(), "runtime_grace_exceeded");
    match err {
        RuntimeError::GraceExceeded { grace, stuck } => {
            assert_eq!(grace, Duration::from_millis(20));
            assert_eq!(stuck, vec![TaskId::from("stuck")]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
