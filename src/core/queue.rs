//! # TaskQueue: bounded-concurrency cancellable task queue.
//!
//! Public facade over the scheduler and the aggregator.
//!
//! ## Key responsibilities
//! - accept submissions (`pending`) and admit them FIFO up to `max_concurrency`
//! - cancel pending or running tasks by identity
//! - publish snapshots of every task's state to observers
//! - shut down gracefully within [`QueueConfig::grace`]
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use futures::StreamExt;
//! use taskqueue::{QueueConfig, TaskContext, TaskError, TaskQueue, TaskStatus, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = TaskQueue::new(QueueConfig::new(2))?;
//!
//!     queue.submit("upload-1", WorkFn::arc(|ctx: TaskContext| async move {
//!         for step in 1..=4u8 {
//!             tokio::time::sleep(Duration::from_millis(5)).await;
//!             ctx.progress(step * 25);
//!         }
//!         Ok::<(), TaskError>(())
//!     }))?;
//!
//!     let mut updates = queue.observe();
//!     while let Some(snapshot) = updates.next().await {
//!         if snapshot.status("upload-1") == Some(TaskStatus::Completed) {
//!             break;
//!         }
//!     }
//!     queue.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{broadcast, watch};
use tracing::warn;

use crate::{
    config::QueueConfig,
    error::{QueueError, RuntimeError},
    state::{Snapshot, TaskId, TaskStatus},
    tasks::{TaskSpec, WorkRef},
};

use super::{builder::TaskQueueBuilder, scheduler::Scheduler};

/// Bounded-concurrency task queue with cancellation and snapshot publication.
///
/// Dropping the queue closes it: pending and running tasks are cancelled
/// without waiting. Use [`shutdown`](Self::shutdown) to wait for work to exit.
pub struct TaskQueue {
    cfg: QueueConfig,
    scheduler: Arc<Scheduler>,
    latest: watch::Receiver<Arc<Snapshot>>,
    updates: broadcast::Sender<Arc<Snapshot>>,
}

impl TaskQueue {
    /// Creates a queue without subscribers.
    ///
    /// Fails with [`QueueError::Configuration`] if `max_concurrency` is 0.
    /// Must be called from within a tokio runtime.
    pub fn new(cfg: QueueConfig) -> Result<Self, QueueError> {
        Self::builder(cfg).build()
    }

    /// Returns a builder for a queue with subscribers.
    pub fn builder(cfg: QueueConfig) -> TaskQueueBuilder {
        TaskQueueBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: QueueConfig,
        scheduler: Arc<Scheduler>,
        latest: watch::Receiver<Arc<Snapshot>>,
        updates: broadcast::Sender<Arc<Snapshot>>,
    ) -> Self {
        Self {
            cfg,
            scheduler,
            latest,
            updates,
        }
    }

    /// Configuration the queue was built with.
    pub fn config(&self) -> &QueueConfig {
        &self.cfg
    }

    /// Submits work under the given identity.
    ///
    /// The task is `pending` immediately and starts once a slot is free.
    /// Fails with [`QueueError::DuplicateTask`] while the identity is pending
    /// or running, and with [`QueueError::Closed`] after shutdown. Never blocks.
    pub fn submit(&self, id: impl Into<TaskId>, work: WorkRef) -> Result<(), QueueError> {
        self.submit_spec(TaskSpec::new(id, work))
    }

    /// Submits a full [`TaskSpec`].
    pub fn submit_spec(&self, spec: TaskSpec) -> Result<(), QueueError> {
        self.scheduler.submit(spec)
    }

    /// Cancels a task.
    ///
    /// - pending: removed before it ever runs
    /// - running: its token is cancelled and its work future dropped
    /// - finished or unknown: no-op
    pub fn cancel(&self, id: impl Into<TaskId>) {
        self.scheduler.cancel(&id.into());
    }

    /// Removes a `completed` or `failed` task from the snapshot. No-op otherwise.
    pub fn clear(&self, id: impl Into<TaskId>) {
        self.scheduler.clear(&id.into());
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.latest.borrow())
    }

    /// Stream of snapshots: the latest one first, then one per applied event.
    ///
    /// The stream is unbounded and ends only after the queue is dropped and all
    /// work has exited. An observer that falls more than
    /// [`QueueConfig::bus_capacity`] snapshots behind skips to newer ones; each
    /// snapshot is complete, so nothing but intermediate states is lost.
    pub fn observe(&self) -> BoxStream<'static, Arc<Snapshot>> {
        let rx = self.updates.subscribe();
        let replay = self.snapshot();
        let replayed = replay.version();

        let live = stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(snapshot) => return Some((snapshot, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "snapshot observer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .filter(move |s| futures::future::ready(s.version() > replayed));

        stream::once(futures::future::ready(replay))
            .chain(live)
            .boxed()
    }

    /// Waits until a published snapshot satisfies `pred` and returns it.
    ///
    /// Returns `None` if the aggregator is gone.
    pub async fn wait_until<F>(&self, mut pred: F) -> Option<Arc<Snapshot>>
    where
        F: FnMut(&Snapshot) -> bool,
    {
        let mut rx = self.latest.clone();
        let snapshot = rx.wait_for(|s| pred(s)).await.ok()?;
        Some(Arc::clone(&snapshot))
    }

    /// Waits until the scheduler holds no pending or running task and the
    /// published snapshot shows none either.
    ///
    /// Every transition that empties the scheduler publishes its event under
    /// the scheduler lock, so a task submitted before the call keeps this
    /// pending until its terminal event is in the snapshot. A task that is
    /// submitted and cancelled before the aggregator saw it may be missing
    /// from the returned snapshot.
    pub async fn wait_idle(&self) -> Option<Arc<Snapshot>> {
        let scheduler = Arc::clone(&self.scheduler);
        self.wait_until(move |s| {
            s.count(TaskStatus::Pending) == 0
                && s.count(TaskStatus::Running) == 0
                && scheduler.counts() == (0, 0)
        })
        .await
    }

    /// Number of tasks waiting for a slot, as the scheduler sees them now.
    pub fn pending(&self) -> usize {
        self.scheduler.counts().0
    }

    /// Number of tasks holding a slot, as the scheduler sees them now.
    pub fn running(&self) -> usize {
        self.scheduler.counts().1
    }

    /// Closes the queue, cancels every pending and running task, and waits up
    /// to [`QueueConfig::grace`] for work functions to exit.
    ///
    /// Later submissions fail with [`QueueError::Closed`].
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.scheduler.shutdown(self.cfg.grace).await
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        self.scheduler.close();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;
    use tokio::time::timeout;

    use super::*;
    use crate::events::{Event, EventKind};
    use crate::tasks::{TaskContext, WorkFn};
    use crate::TaskError;

    fn until_cancelled() -> WorkRef {
        WorkFn::arc(|ctx: TaskContext| async move {
            ctx.cancelled().await;
            Err::<(), TaskError>(TaskError::Canceled)
        })
    }

    #[tokio::test]
    async fn observer_sees_event_built_before_a_newer_one() {
        let queue = TaskQueue::new(QueueConfig::new(2)).unwrap();
        queue
            .submit("a", WorkFn::arc(|_ctx: TaskContext| async { Ok::<(), TaskError>(()) }))
            .unwrap();
        queue
            .wait_until(|s| s.status("a") == Some(TaskStatus::Completed))
            .await
            .unwrap();

        // takes its seq now, reaches the aggregator after "b"
        let early_clear = Event::new(EventKind::Cleared).with_task("a");
        queue.submit("b", until_cancelled()).unwrap();
        queue
            .wait_until(|s| s.status("b") == Some(TaskStatus::Running))
            .await
            .unwrap();

        let mut updates = queue.observe();
        let replay = updates.next().await.unwrap();
        assert!(replay.get("a").is_some());

        queue.scheduler.bus().publish(early_clear);
        let next = timeout(Duration::from_secs(1), updates.next())
            .await
            .expect("clear reaches the observer")
            .unwrap();
        assert!(next.get("a").is_none());
        assert_eq!(next.version(), replay.version() + 1);
        assert_eq!(*next, *queue.snapshot());
    }

    #[tokio::test]
    async fn wait_idle_right_after_submit_waits_for_the_task() {
        let queue = TaskQueue::new(QueueConfig::new(1)).unwrap();
        queue.submit("x", until_cancelled()).unwrap();

        assert!(
            timeout(Duration::from_millis(50), queue.wait_idle())
                .await
                .is_err()
        );
        assert_eq!(queue.running(), 1);

        queue.cancel("x");
        let idle = timeout(Duration::from_secs(1), queue.wait_idle())
            .await
            .unwrap()
            .unwrap();
        assert!(idle.is_empty());
        assert_eq!((queue.running(), queue.pending()), (0, 0));
    }

    #[tokio::test]
    async fn wait_idle_returns_the_finished_snapshot() {
        let queue = TaskQueue::new(QueueConfig::new(1)).unwrap();
        queue
            .submit("y", WorkFn::arc(|ctx: TaskContext| async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                ctx.progress(100);
                Ok::<(), TaskError>(())
            }))
            .unwrap();

        let idle = timeout(Duration::from_secs(1), queue.wait_idle())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(idle.status("y"), Some(TaskStatus::Completed));
    }
}
