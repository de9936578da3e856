//! # LogWriter: event logger
//!
//! A minimal subscriber that writes every [`Event`] through `tracing`.
//! Lifecycle transitions log at `info`, progress at `debug`, failures and
//! subscriber diagnostics at `warn`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO taskqueue::subscribers::log: pending task=upload-1
//! INFO taskqueue::subscribers::log: running task=upload-1
//! DEBUG taskqueue::subscribers::log: progress task=upload-1 progress=40
//! WARN taskqueue::subscribers::log: failed task=upload-1 progress=40 reason="execution failed: reset"
//! INFO taskqueue::subscribers::log: cancelled task=upload-2
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event logger subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_ref().map(|t| t.as_str()).unwrap_or("-");
        match e.kind {
            EventKind::Pending => info!(task, "pending"),
            EventKind::Running => info!(task, "running"),
            EventKind::Progress => debug!(task, progress = e.progress, "progress"),
            EventKind::Completed => info!(task, "completed"),
            EventKind::Failed => warn!(
                task,
                progress = e.progress,
                reason = e.reason.as_deref().unwrap_or("unknown"),
                "failed"
            ),
            EventKind::Cancelled => info!(task, "cancelled"),
            EventKind::Cleared => debug!(task, "cleared"),
            EventKind::SubscriberOverflow => {
                warn!(reason = e.reason.as_deref(), "subscriber overflow")
            }
            EventKind::SubscriberPanicked => {
                warn!(reason = e.reason.as_deref(), "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
