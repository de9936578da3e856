//! # Submission specification.
//!
//! [`TaskSpec`] bundles what [`TaskQueue::submit_spec`](crate::TaskQueue::submit_spec)
//! needs: the identity, the work, and an optional deadline overriding
//! [`QueueConfig::timeout`](crate::QueueConfig::timeout).

use std::time::Duration;

use crate::state::TaskId;
use crate::tasks::WorkRef;

/// Specification of one submission.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use taskqueue::{TaskContext, TaskError, TaskSpec, WorkFn};
///
/// let spec = TaskSpec::new("upload-1", WorkFn::arc(|_ctx: TaskContext| async {
///     Ok::<(), TaskError>(())
/// }))
/// .with_timeout(Duration::from_secs(30));
///
/// assert_eq!(spec.id().as_str(), "upload-1");
/// assert_eq!(spec.timeout(), Some(Duration::from_secs(30)));
/// ```
#[derive(Clone)]
pub struct TaskSpec {
    id: TaskId,
    work: WorkRef,
    timeout: Option<Duration>,
}

impl TaskSpec {
    /// Creates a spec with no deadline of its own (the queue default applies).
    pub fn new(id: impl Into<TaskId>, work: WorkRef) -> Self {
        Self {
            id: id.into(),
            work,
            timeout: None,
        }
    }

    /// Creates a spec with a generated identity.
    pub fn anonymous(work: WorkRef) -> Self {
        Self::new(TaskId::generate(), work)
    }

    /// Returns a new spec with the given deadline (`0s` = none, overriding the queue default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Task identity.
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Work to execute.
    pub fn work(&self) -> &WorkRef {
        &self.work
    }

    /// Per-task deadline, if set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Deadline to apply given the queue default; `0s` disables it.
    pub(crate) fn effective_timeout(&self, default: Option<Duration>) -> Option<Duration> {
        self.timeout
            .or(default)
            .filter(|d| *d > Duration::ZERO)
    }
}

impl std::fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSpec")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaskContext, TaskError, WorkFn};

    fn noop() -> WorkRef {
        WorkFn::arc(|_ctx: TaskContext| async { Ok::<(), TaskError>(()) })
    }

    #[test]
    fn own_timeout_overrides_default() {
        let default = Some(Duration::from_secs(5));

        let spec = TaskSpec::new("a", noop());
        assert_eq!(spec.effective_timeout(default), default);

        let spec = spec.with_timeout(Duration::from_secs(1));
        assert_eq!(spec.effective_timeout(default), Some(Duration::from_secs(1)));

        let spec = TaskSpec::new("a", noop()).with_timeout(Duration::ZERO);
        assert_eq!(spec.effective_timeout(default), None);
    }

    #[test]
    fn anonymous_specs_get_distinct_ids() {
        let a = TaskSpec::anonymous(noop());
        let b = TaskSpec::anonymous(noop());
        assert_ne!(a.id(), b.id());
    }
}
