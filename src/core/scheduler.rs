//! # Scheduler: admission, concurrency limit, cancellation.
//!
//! Owns the FIFO admission queue and the set of running tasks. Every state
//! transition that can race (admit, cancel, terminal outcome) happens under
//! one lock, and its event is published while the lock is held.
//!
//! ## Flow
//! ```text
//! submit(spec)
//!   ├─► closed?            → Err(Closed)
//!   ├─► pending/running?   → Err(DuplicateTask)
//!   ├─► publish Pending{epoch}
//!   └─► admit()
//!
//! admit()  (after submit, finish, cancel)
//!   while running < max_concurrency and pending not empty:
//!     ├─► pop front
//!     ├─► publish Running{epoch}
//!     └─► spawn Runner (child token of root)
//!
//! cancel(id)
//!   ├─► pending → remove, publish Cancelled   (never started)
//!   ├─► running → cancel token, remove, publish Cancelled, admit()
//!   └─► else    → no-op
//!
//! finish(id, epoch, outcome)   (called by the runner)
//!   ├─► entry gone or other epoch → discard (cancel won the race)
//!   └─► remove, publish Completed/Failed/Cancelled, admit()
//! ```
//!
//! ## Rules
//! - A task gets **exactly one** terminal event: whoever takes the lock first decides it.
//! - Admission is strictly FIFO; no priorities.
//! - `running.len()` never exceeds `max_concurrency`.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::error::{QueueError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::state::TaskId;
use crate::tasks::{TaskContext, TaskSpec};

use super::runner::{Outcome, Runner};

/// Submission counter; distinguishes reuses of one identity.
static EPOCH: AtomicU64 = AtomicU64::new(1);

/// Submitted task waiting for a slot.
struct Queued {
    spec: TaskSpec,
    epoch: u64,
}

/// Admitted task occupying a slot.
struct Admitted {
    epoch: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct State {
    closed: bool,
    pending: VecDeque<Queued>,
    running: HashMap<TaskId, Admitted>,
    /// Runners whose work has not returned yet (epoch → id), including cancelled ones.
    executing: HashMap<u64, TaskId>,
}

impl State {
    fn is_active(&self, id: &TaskId) -> bool {
        self.running.contains_key(id) || self.pending.iter().any(|q| q.spec.id() == id)
    }
}

/// Admission control and the single point of mutual exclusion per task.
pub(crate) struct Scheduler {
    state: Mutex<State>,
    max_concurrency: usize,
    default_timeout: Option<Duration>,
    bus: Bus,
    runners: TaskTracker,
    root: CancellationToken,
}

impl Scheduler {
    pub fn new(max_concurrency: usize, default_timeout: Option<Duration>, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
            max_concurrency,
            default_timeout,
            bus,
            runners: TaskTracker::new(),
            root: CancellationToken::new(),
        })
    }

    /// Records the task as pending and admits it if a slot is free.
    pub fn submit(self: &Arc<Self>, spec: TaskSpec) -> Result<(), QueueError> {
        let mut st = self.lock();
        if st.closed {
            return Err(QueueError::Closed);
        }
        if st.is_active(spec.id()) {
            return Err(QueueError::DuplicateTask {
                id: spec.id().clone(),
            });
        }

        let epoch = EPOCH.fetch_add(1, Ordering::Relaxed);
        self.bus.publish(
            Event::new(EventKind::Pending)
                .with_task(spec.id())
                .with_epoch(epoch)
                .with_progress(0),
        );
        debug!(task = %spec.id(), epoch, queued = st.pending.len() + 1, "task pending");

        st.pending.push_back(Queued { spec, epoch });
        self.admit(&mut st);
        Ok(())
    }

    /// Cancels a pending or running task. Returns `false` if there was nothing to cancel.
    pub fn cancel(self: &Arc<Self>, id: &TaskId) -> bool {
        let mut st = self.lock();

        if let Some(pos) = st.pending.iter().position(|q| q.spec.id() == id) {
            if let Some(q) = st.pending.remove(pos) {
                debug!(task = %id, epoch = q.epoch, "pending task cancelled");
                self.publish_cancelled(id, q.epoch);
            }
            return true;
        }

        if let Some(admitted) = st.running.remove(id) {
            admitted.token.cancel();
            debug!(task = %id, epoch = admitted.epoch, "running task cancelled");
            self.publish_cancelled(id, admitted.epoch);
            self.admit(&mut st);
            return true;
        }

        debug!(task = %id, "cancel ignored: task not active");
        false
    }

    /// Asks the aggregator to drop a finished task from the snapshot.
    pub fn clear(&self, id: &TaskId) {
        self.bus.publish(Event::new(EventKind::Cleared).with_task(id));
    }

    /// Records the outcome of a runner. Called exactly once per admitted task.
    pub(super) fn finish(self: &Arc<Self>, id: &TaskId, epoch: u64, outcome: Outcome, progress: u8) {
        let mut st = self.lock();
        st.executing.remove(&epoch);

        match st.running.get(id) {
            Some(admitted) if admitted.epoch == epoch => {
                st.running.remove(id);
            }
            _ => {
                debug!(task = %id, epoch, outcome = outcome.as_label(), "outcome discarded: task no longer running");
                return;
            }
        }

        let ev = match outcome {
            Outcome::Completed => Event::new(EventKind::Completed).with_progress(100),
            Outcome::Failed(reason) => Event::new(EventKind::Failed)
                .with_progress(progress)
                .with_reason(reason),
            Outcome::Cancelled => Event::new(EventKind::Cancelled),
        };
        self.bus.publish(ev.with_task(id).with_epoch(epoch));
        self.admit(&mut st);
    }

    /// Number of pending and running tasks, as the scheduler sees them right now.
    pub fn counts(&self) -> (usize, usize) {
        let st = self.lock();
        (st.pending.len(), st.running.len())
    }

    /// Stops admission and cancels every pending and running task.
    ///
    /// Idempotent. Does not wait for work functions to return.
    pub fn close(&self) {
        {
            let mut st = self.lock();
            if !st.closed {
                st.closed = true;
                for q in std::mem::take(&mut st.pending) {
                    self.publish_cancelled(q.spec.id(), q.epoch);
                }
                for (id, admitted) in std::mem::take(&mut st.running) {
                    admitted.token.cancel();
                    self.publish_cancelled(&id, admitted.epoch);
                }
            }
        }
        self.root.cancel();
        self.runners.close();
    }

    /// [`close`](Self::close), then waits up to `grace` for all runners to exit.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), RuntimeError> {
        self.close();
        if tokio::time::timeout(grace, self.runners.wait()).await.is_ok() {
            return Ok(());
        }

        let mut stuck: Vec<TaskId> = self.lock().executing.values().cloned().collect();
        stuck.sort_unstable();
        stuck.dedup();
        warn!(?grace, ?stuck, "shutdown grace exceeded");
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// Admits pending tasks while slots are free.
    fn admit(self: &Arc<Self>, st: &mut State) {
        while !st.closed && st.running.len() < self.max_concurrency {
            let Some(Queued { spec, epoch }) = st.pending.pop_front() else {
                break;
            };
            let id = spec.id().clone();
            let token = self.root.child_token();

            self.bus.publish(
                Event::new(EventKind::Running)
                    .with_task(&id)
                    .with_epoch(epoch)
                    .with_progress(0),
            );
            st.running.insert(
                id.clone(),
                Admitted {
                    epoch,
                    token: token.clone(),
                },
            );
            st.executing.insert(epoch, id.clone());
            debug!(task = %id, epoch, running = st.running.len(), "task admitted");

            let runner = Runner::new(
                TaskContext::new(id, epoch, token, self.bus.clone()),
                spec.work().clone(),
                spec.effective_timeout(self.default_timeout),
            );
            self.runners.spawn(runner.execute(Arc::clone(self)));
        }
    }

    fn publish_cancelled(&self, id: &TaskId, epoch: u64) {
        self.bus.publish(
            Event::new(EventKind::Cancelled)
                .with_task(id)
                .with_epoch(epoch),
        );
    }

    #[cfg(test)]
    pub(super) fn bus(&self) -> &Bus {
        &self.bus
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
