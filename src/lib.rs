//! # taskqueue
//!
//! **Taskqueue** is a bounded-concurrency, cancellable task queue for async Rust.
//!
//! Callers submit identified units of work. At most `max_concurrency` of them
//! run at once; the rest wait in FIFO order. Any task can be cancelled while
//! waiting or while running, and every change of any task's state is published
//! to observers as a complete, immutable [`Snapshot`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   submit(id, work)     cancel(id)     clear(id)
//!          │                 │              │
//!          ▼                 ▼              ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │  Scheduler (one lock: admission, cancellation, outcomes)  │
//! │  - FIFO pending queue                                     │
//! │  - running set (≤ max_concurrency, one token each)        │
//! └──────┬───────────────────┬────────────────────┬───────────┘
//!        ▼                   ▼                    ▼
//!   ┌──────────┐        ┌──────────┐         ┌──────────┐
//!   │  Runner  │        │  Runner  │   ...   │  Runner  │
//!   │ work.run │        │ work.run │         │ work.run │
//!   └────┬─────┘        └────┬─────┘         └────┬─────┘
//!        │ Progress          │ outcome → Scheduler::finish
//!        ▼                   ▼                    ▼
//! ┌───────────────────────────────────────────────────────────┐
//! │                 Bus (ordered event channel)               │
//! └─────────────────────────────┬─────────────────────────────┘
//!                               ▼
//!                   ┌───────────────────────┐
//!                   │ Aggregator (1 writer) │
//!                   │  Registry::apply(ev)  │
//!                   └───┬───────────────┬───┘
//!                       ▼               ▼
//!              Snapshot observers   SubscriberSet
//!              (observe/snapshot)   (per-sub queues)
//! ```
//!
//! ### Lifecycle
//! ```text
//! Pending ──► Running ──► Completed (progress 100)
//!    │           ├──────► Failed(reason, last progress)
//!    │           └──────► Cancelled ─► removed from the snapshot
//!    └──────────────────► Cancelled ─► removed from the snapshot
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                        |
//! |-------------------|---------------------------------------------------------------|-------------------------------------------|
//! | **Queue**         | Submit, cancel, clear, observe, shut down.                    | [`TaskQueue`], [`TaskQueueBuilder`]       |
//! | **Work**          | Async work with cancellation and progress reporting.          | [`Work`], [`WorkFn`], [`TaskContext`]     |
//! | **State**         | Immutable snapshots of every task's state.                    | [`Snapshot`], [`TaskRecord`], [`TaskStatus`] |
//! | **Subscriber API**| Hook into applied lifecycle events.                           | [`Subscribe`]                             |
//! | **Errors**        | Typed errors for submission, work and shutdown.               | [`QueueError`], [`TaskError`], [`RuntimeError`] |
//! | **Configuration** | Concurrency limit, deadlines, retention, grace period.        | [`QueueConfig`], [`Retention`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{QueueConfig, TaskContext, TaskError, TaskQueue, TaskStatus, WorkFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let queue = TaskQueue::builder(QueueConfig::new(2))
//!         .with_subscribers(Vec::new())
//!         .build()?;
//!
//!     for name in ["a", "b", "c"] {
//!         queue.submit(name, WorkFn::arc(|ctx: TaskContext| async move {
//!             tokio::time::sleep(Duration::from_millis(10)).await;
//!             ctx.progress(100);
//!             Ok::<(), TaskError>(())
//!         }))?;
//!     }
//!     assert!(queue.running() <= 2);
//!
//!     let done = queue
//!         .wait_until(|s| s.count(TaskStatus::Completed) == 3)
//!         .await
//!         .expect("queue alive");
//!     assert_eq!(done.len(), 3);
//!
//!     queue.shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod state;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::{QueueConfig, Retention};
pub use core::{TaskQueue, TaskQueueBuilder};
pub use error::{QueueError, RuntimeError, TaskError};
pub use events::{Event, EventKind};
pub use state::{Snapshot, TaskId, TaskRecord, TaskStatus};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{TaskContext, TaskSpec, Work, WorkFn, WorkRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
