use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::TaskContext;

/// # Asynchronous, cancelable unit of work.
///
/// The payload of a task. [`run`](Work::run) receives a [`TaskContext`] carrying
/// the cancellation token and a progress reporter. Implementations should
/// check cancellation between stages and may return [`TaskError::Canceled`]
/// when they observe it. Partial side effects are not rolled back by the queue.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use taskqueue::{TaskContext, TaskError, Work};
///
/// struct Upload { chunks: u8 }
///
/// #[async_trait]
/// impl Work for Upload {
///     async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
///         for i in 1..=self.chunks {
///             if ctx.is_cancelled() {
///                 return Err(TaskError::Canceled);
///             }
///             // send chunk i...
///             ctx.progress((u16::from(i) * 100 / u16::from(self.chunks)) as u8);
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Work: Send + Sync + 'static {
    /// Executes the work until completion, failure, or cancellation.
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError>;
}

/// Shared handle to work.
pub type WorkRef = Arc<dyn Work>;
