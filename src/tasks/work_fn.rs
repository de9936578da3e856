//! # Function-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn(TaskContext) -> Fut`, producing a fresh
//! future per run. No hidden mutation between runs; share state explicitly
//! with `Arc<...>` inside the closure if needed.
//!
//! ## Example
//! ```rust
//! use taskqueue::{TaskContext, TaskError, WorkFn, WorkRef};
//!
//! let w: WorkRef = WorkFn::arc(|ctx: TaskContext| async move {
//!     ctx.progress(50);
//!     Ok::<_, TaskError>(())
//! });
//! # let _ = w;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::{TaskContext, Work};

/// Function-backed work implementation.
pub struct WorkFn<F> {
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates new function-backed work.
    ///
    /// Prefer [`WorkFn::arc`] when you immediately need a [`WorkRef`](crate::WorkRef).
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the work and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Work for WorkFn<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
