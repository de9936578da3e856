//! # Per-task execution context.
//!
//! Handed to [`Work::run`](crate::Work::run). Carries:
//! - the task identity,
//! - a [`CancellationToken`] cancelled when the task is cancelled, times out or the queue shuts down,
//! - a progress reporter publishing `Progress` events.
//!
//! ## Progress rules
//! - Values are clamped to `[0, 100]`.
//! - Non-increasing values are ignored.
//! - Nothing is published once the token is cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::state::TaskId;

/// Execution context of one running task. Cheap to clone.
#[derive(Clone)]
pub struct TaskContext {
    id: TaskId,
    epoch: u64,
    token: CancellationToken,
    progress: Arc<AtomicU8>,
    bus: Bus,
}

impl TaskContext {
    pub(crate) fn new(id: TaskId, epoch: u64, token: CancellationToken, bus: Bus) -> Self {
        Self {
            id,
            epoch,
            token,
            progress: Arc::new(AtomicU8::new(0)),
            bus,
        }
    }

    /// Identity of the task being executed.
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Cancellation token for this task.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// True once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when cancellation is requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Reports progress in percent.
    ///
    /// Returns `true` if the value was published.
    pub fn progress(&self, value: u8) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        let value = value.min(100);
        let prev = self.progress.fetch_max(value, Ordering::AcqRel);
        if value <= prev {
            return false;
        }
        self.bus.publish(
            Event::new(EventKind::Progress)
                .with_task(&self.id)
                .with_epoch(self.epoch)
                .with_progress(value),
        );
        true
    }

    /// Last reported progress.
    pub fn last_progress(&self) -> u8 {
        self.progress.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("id", &self.id)
            .field("epoch", &self.epoch)
            .field("cancelled", &self.token.is_cancelled())
            .field("progress", &self.last_progress())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publishes_only_increasing_values() {
        let (bus, mut rx) = Bus::new();
        let ctx = TaskContext::new("a".into(), 7, CancellationToken::new(), bus);

        assert!(ctx.progress(20));
        assert!(!ctx.progress(10));
        assert!(!ctx.progress(20));
        assert!(ctx.progress(200));
        assert_eq!(ctx.last_progress(), 100);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::Progress);
        assert_eq!(first.epoch, Some(7));
        assert_eq!(first.progress, Some(20));
        assert_eq!(rx.recv().await.unwrap().progress, Some(100));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn silent_after_cancellation() {
        let (bus, mut rx) = Bus::new();
        let token = CancellationToken::new();
        let ctx = TaskContext::new("a".into(), 1, token.clone(), bus);

        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(!ctx.progress(40));
        assert!(rx.try_recv().is_err());
    }
}
