//! # Lifecycle events emitted by the scheduler, runners and subscriber workers.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Lifecycle events**: per-task state transitions (pending, running, progress, terminal)
//! - **Retention events**: removal of finished tasks from the snapshot
//! - **Subscriber events**: diagnostics of the subscriber fan-out
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) taken when the
//! event is built. It reflects creation order only: progress and clear events
//! are built outside the scheduler lock and may reach the aggregator after an
//! event with a higher `seq`. Apply order is what [`Snapshot::version`](crate::Snapshot::version)
//! counts. Events for one identity also carry the submission `epoch`, which
//! the aggregator uses to reject stale events of a reused identity.
//!
//! ## Example
//! ```rust
//! use taskqueue::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::Failed)
//!     .with_task("upload-7")
//!     .with_epoch(3)
//!     .with_progress(50)
//!     .with_reason("connection reset");
//!
//! assert_eq!(ev.kind, EventKind::Failed);
//! assert_eq!(ev.task.as_ref().map(|t| t.as_str()), Some("upload-7"));
//! assert_eq!(ev.progress, Some(50));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::state::{TaskId, TaskStatus};

/// Global creation counter. Starts at 1.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Task lifecycle events ===
    /// Task was submitted and is waiting for a slot.
    ///
    /// Sets: `task`, `epoch`, `progress = 0`
    Pending,

    /// Task was admitted and its work function started.
    ///
    /// Sets: `task`, `epoch`, `progress = 0`
    Running,

    /// Work function reported progress.
    ///
    /// Sets: `task`, `epoch`, `progress`
    Progress,

    /// Work function finished successfully.
    ///
    /// Sets: `task`, `epoch`, `progress = 100`
    Completed,

    /// Work function failed, panicked or timed out.
    ///
    /// Sets: `task`, `epoch`, `progress` (last known), `reason`
    Failed,

    /// Task was cancelled (pending or running). Removes it from the snapshot.
    ///
    /// Sets: `task`, `epoch`
    Cancelled,

    // === Retention events ===
    /// A completed/failed task was removed from the snapshot (explicit clear or expiry).
    ///
    /// Sets: `task`, `epoch` (unset = whatever submission is current)
    Cleared,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason` (`subscriber=<name> reason=<full|closed>`)
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (`subscriber=<name> panic=<info>`)
    SubscriberPanicked,
}

impl EventKind {
    /// Lifecycle state this event moves its task into, if any.
    pub fn status(self) -> Option<TaskStatus> {
        match self {
            EventKind::Pending => Some(TaskStatus::Pending),
            EventKind::Running | EventKind::Progress => Some(TaskStatus::Running),
            EventKind::Completed => Some(TaskStatus::Completed),
            EventKind::Failed => Some(TaskStatus::Failed),
            EventKind::Cancelled => Some(TaskStatus::Cancelled),
            EventKind::Cleared | EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                None
            }
        }
    }

    /// True for `Completed`, `Failed` and `Cancelled`.
    pub fn is_terminal(self) -> bool {
        self.status().is_some_and(TaskStatus::is_terminal)
    }
}

/// Runtime event with optional metadata.
///
/// - `seq`: global creation sequence (not apply order)
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique creation sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Task identity, if applicable.
    pub task: Option<TaskId>,
    /// Submission epoch of the task, if applicable.
    pub epoch: Option<u64>,
    /// Progress value in `[0, 100]`.
    pub progress: Option<u8>,
    /// Human-readable reason (failure message, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            epoch: None,
            progress: None,
            reason: None,
        }
    }

    /// Attaches a task identity.
    #[inline]
    pub fn with_task(mut self, task: impl Into<TaskId>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a submission epoch.
    #[inline]
    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    /// Attaches a progress value (clamped to 100).
    #[inline]
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
