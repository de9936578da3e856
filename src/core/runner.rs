//! # Execution runner: drives one admitted task to an outcome.
//!
//! ```text
//! Runner::execute(scheduler)
//!   ├─► work.run(ctx)  (panic-isolated, optional deadline)
//!   │     ├─ token cancelled  → Cancelled (work future dropped)
//!   │     ├─ Ok(())           → Completed
//!   │     ├─ Err(Canceled)    → Cancelled
//!   │     ├─ Err(e)           → Failed(e)
//!   │     ├─ deadline hit     → cancel token, Failed(timeout)
//!   │     └─ panic            → Failed("work panicked: ..")
//!   └─► scheduler.finish(id, epoch, outcome, last progress)
//! ```
//!
//! ## Rules
//! - Cancellation wins over a simultaneously ready result (`biased` select).
//! - Work errors never leave the runner; they become an [`Outcome`].
//! - The runner never publishes a terminal event itself; the scheduler does,
//!   after checking under its lock that the task was not cancelled meanwhile.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::{select, time};

use crate::error::TaskError;
use crate::subscribers::describe_panic;
use crate::tasks::{TaskContext, WorkRef};

use super::scheduler::Scheduler;

/// Result of one execution, before the scheduler turns it into an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Outcome {
    Completed,
    Failed(String),
    Cancelled,
}

impl Outcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            Outcome::Completed => "completed",
            Outcome::Failed(_) => "failed",
            Outcome::Cancelled => "cancelled",
        }
    }
}

/// One admitted task's work, context and deadline.
pub(super) struct Runner {
    ctx: TaskContext,
    work: WorkRef,
    timeout: Option<Duration>,
}

impl Runner {
    pub fn new(ctx: TaskContext, work: WorkRef, timeout: Option<Duration>) -> Self {
        Self { ctx, work, timeout }
    }

    /// Runs the work and reports the outcome to the scheduler.
    pub async fn execute(self, scheduler: Arc<Scheduler>) {
        let id = self.ctx.id().clone();
        let epoch = self.ctx.epoch();
        let progress = self.ctx.clone();

        let outcome = self.run().await;
        scheduler.finish(&id, epoch, outcome, progress.last_progress());
    }

    async fn run(self) -> Outcome {
        let token = self.ctx.token().clone();
        let work = AssertUnwindSafe(self.work.run(self.ctx.clone())).catch_unwind();
        let timeout = self.timeout;

        let guarded = async move {
            match timeout {
                Some(dur) => time::timeout(dur, work).await.map_err(|_elapsed| dur),
                None => Ok(work.await),
            }
        };

        select! {
            biased;
            _ = token.cancelled() => Outcome::Cancelled,
            res = guarded => match res {
                Ok(Ok(Ok(()))) => Outcome::Completed,
                Ok(Ok(Err(TaskError::Canceled))) => Outcome::Cancelled,
                Ok(Ok(Err(e))) => Outcome::Failed(e.to_string()),
                Ok(Err(panic)) => {
                    Outcome::Failed(format!("work panicked: {}", describe_panic(&*panic)))
                }
                Err(dur) => {
                    token.cancel();
                    Outcome::Failed(TaskError::Timeout { timeout: dur }.to_string())
                }
            },
        }
    }
}
