//! Error types used by the queue and by work functions.
//!
//! - [`QueueError`] caller-facing API misuse (bad config, duplicate identity, closed queue).
//! - [`TaskError`] failures raised by a task's work function. These never cross the
//!   queue boundary; the runner turns them into a `failed` state.
//! - [`RuntimeError`] failures of the queue runtime itself (shutdown grace exceeded).
//!
//! All enums provide `as_label` (stable snake_case, for logs/metrics) and `as_message`.

use std::time::Duration;
use thiserror::Error;

use crate::state::TaskId;

/// # Errors reported to callers of the queue API.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Invalid configuration; the queue was not constructed.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The identity is already pending or running.
    #[error("task '{id}' is already active")]
    DuplicateTask {
        /// The colliding identity.
        id: TaskId,
    },

    /// The queue has been shut down and accepts no more submissions.
    #[error("queue is closed")]
    Closed,
}

impl QueueError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskqueue::QueueError;
    ///
    /// let err = QueueError::DuplicateTask { id: "upload-1".into() };
    /// assert_eq!(err.as_label(), "queue_duplicate_task");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::Configuration { .. } => "queue_configuration",
            QueueError::DuplicateTask { .. } => "queue_duplicate_task",
            QueueError::Closed => "queue_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            QueueError::Configuration { reason } => format!("configuration: {reason}"),
            QueueError::DuplicateTask { id } => format!("duplicate task: {id}"),
            QueueError::Closed => "queue closed".to_string(),
        }
    }
}

/// # Errors produced by work functions.
///
/// Returned from [`Work::run`](crate::Work::run). The runner records them as a
/// `failed` terminal state, except [`TaskError::Canceled`] which is the
/// cooperative answer to a cancellation request.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Work exceeded its deadline.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The deadline that was exceeded.
        timeout: Duration,
    },

    /// Work failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Work observed its cancellation token and stopped.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`] from anything displayable.
    ///
    /// # Example
    /// ```
    /// use taskqueue::TaskError;
    ///
    /// let err = TaskError::fail("connection reset");
    /// assert_eq!(err.to_string(), "execution failed: connection reset");
    /// ```
    pub fn fail(error: impl std::fmt::Display) -> Self {
        TaskError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskqueue::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// # Errors produced by the queue runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some work functions did not exit in time.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Identities whose work was still executing.
        stuck: Vec<TaskId>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(
            QueueError::Configuration { reason: "x".into() }.as_label(),
            "queue_configuration"
        );
        assert_eq!(QueueError::Closed.as_label(), "queue_closed");
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
        assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(1),
            stuck: vec![],
        };
        assert_eq!(err.as_label(), "runtime_grace_exceeded");
    }

    #[test]
    fn duplicate_message_names_the_task() {
        let err = QueueError::DuplicateTask { id: "a".into() };
        assert_eq!(err.to_string(), "task 'a' is already active");
        assert_eq!(err.as_message(), "duplicate task: a");
    }
}
