use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use super::TaskId;

/// Lifecycle state of a task. Exactly one holds at any instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Submitted, waiting for a concurrency slot.
    Pending,
    /// Admitted; the work function is executing.
    Running,
    /// Work finished successfully (progress 100).
    Completed,
    /// Work returned an error, panicked, or timed out.
    Failed,
    /// Cancelled before or during execution.
    Cancelled,
}

impl TaskStatus {
    /// True for `Completed`, `Failed` and `Cancelled`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// True for `Pending` and `Running`.
    #[inline]
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state of one task as seen by observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRecord {
    /// Task identity.
    pub id: TaskId,
    /// Lifecycle state.
    pub status: TaskStatus,
    /// Progress in `[0, 100]`.
    pub progress: u8,
    /// Failure message (only for `Failed`).
    pub reason: Option<Arc<str>>,
    /// Submission this record belongs to; changes when an identity is reused.
    pub epoch: u64,
    /// Wall-clock time of the last applied change.
    pub updated_at: SystemTime,
}

impl TaskRecord {
    pub(crate) fn pending(id: TaskId, epoch: u64, at: SystemTime) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            progress: 0,
            reason: None,
            epoch,
            updated_at: at,
        }
    }
}
