//! # Event fold for the authoritative task mapping.
//!
//! Applies lifecycle events in arrival order, per identity:
//!
//! ```text
//! Pending   → insert/replace record (new epoch)
//! Running   → Pending  → Running        (same epoch)
//! Progress  → Running, value increases  (same epoch)
//! Completed → Running  → Completed, 100 (same epoch)
//! Failed    → Running  → Failed         (same epoch, progress kept)
//! Cancelled → Pending|Running → removed (same epoch)
//! Cleared   → Completed|Failed → removed (same epoch, or any if unset)
//! ```
//!
//! ## Rules
//! - Events whose epoch does not match the current record are **stale** and rejected.
//! - Once a record is terminal nothing but `Cleared` or a new `Pending` touches it.
//! - Progress never decreases and is clamped to 100.
//! - `version` counts applied events. It follows apply order, not event `seq`:
//!   events built outside the scheduler lock (progress, clear) may arrive with
//!   a lower `seq` than one already applied.

use std::collections::BTreeMap;

use crate::events::{Event, EventKind};

use super::{Snapshot, TaskId, TaskRecord, TaskStatus};

/// Authoritative identity → record mapping, owned by the aggregator.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    /// Number of applied events; the version of the next snapshot.
    version: u64,
    tasks: BTreeMap<TaskId, TaskRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event. Returns `true` if the mapping changed.
    pub fn apply(&mut self, ev: &Event) -> bool {
        let Some(id) = ev.task.as_ref() else {
            return false;
        };
        let changed = match ev.kind {
            EventKind::Pending => {
                let Some(epoch) = ev.epoch else { return false };
                self.tasks
                    .insert(id.clone(), TaskRecord::pending(id.clone(), epoch, ev.at));
                true
            }
            EventKind::Running => self.transition(ev, |r| {
                if r.status != TaskStatus::Pending {
                    return false;
                }
                r.status = TaskStatus::Running;
                r.progress = 0;
                true
            }),
            EventKind::Progress => {
                let value = ev.progress.unwrap_or(0).min(100);
                self.transition(ev, |r| {
                    if r.status != TaskStatus::Running || value <= r.progress {
                        return false;
                    }
                    r.progress = value;
                    true
                })
            }
            EventKind::Completed => self.transition(ev, |r| {
                if r.status != TaskStatus::Running {
                    return false;
                }
                r.status = TaskStatus::Completed;
                r.progress = 100;
                true
            }),
            EventKind::Failed => self.transition(ev, |r| {
                if r.status != TaskStatus::Running {
                    return false;
                }
                r.status = TaskStatus::Failed;
                r.reason = ev.reason.clone();
                true
            }),
            EventKind::Cancelled => self.remove_if(ev, TaskStatus::is_active),
            EventKind::Cleared => self.remove_if(ev, |s| {
                matches!(s, TaskStatus::Completed | TaskStatus::Failed)
            }),
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => false,
        };
        if changed {
            self.version += 1;
        }
        changed
    }

    /// Builds an immutable snapshot of the current mapping.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.version, self.tasks.clone())
    }

    /// Current status of `id`, if tracked.
    #[cfg(test)]
    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        self.tasks.get(id).map(|r| r.status)
    }

    fn transition(&mut self, ev: &Event, f: impl FnOnce(&mut TaskRecord) -> bool) -> bool {
        let Some(record) = self.current_mut(ev) else {
            return false;
        };
        if f(record) {
            record.updated_at = ev.at;
            true
        } else {
            false
        }
    }

    fn remove_if(&mut self, ev: &Event, pred: impl FnOnce(TaskStatus) -> bool) -> bool {
        let Some(record) = self.current_mut(ev) else {
            return false;
        };
        if !pred(record.status) {
            return false;
        }
        let id = record.id.clone();
        self.tasks.remove(&id).is_some()
    }

    /// Record for the event's identity, if the epoch matches (or the event has none).
    fn current_mut(&mut self, ev: &Event) -> Option<&mut TaskRecord> {
        let id = ev.task.as_ref()?;
        let record = self.tasks.get_mut(id)?;
        match ev.epoch {
            Some(epoch) if epoch != record.epoch => None,
            _ => Some(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: EventKind, id: &str, epoch: u64) -> Event {
        Event::new(kind).with_task(id).with_epoch(epoch)
    }

    #[test]
    fn full_lifecycle_to_completed() {
        let mut reg = Registry::new();
        assert!(reg.apply(&ev(EventKind::Pending, "a", 1)));
        assert_eq!(reg.status("a"), Some(TaskStatus::Pending));
        assert!(reg.apply(&ev(EventKind::Running, "a", 1)));
        assert!(reg.apply(&ev(EventKind::Progress, "a", 1).with_progress(40)));
        assert!(reg.apply(&ev(EventKind::Completed, "a", 1).with_progress(100)));

        let snap = reg.snapshot();
        let rec = snap.get("a").unwrap();
        assert_eq!(rec.status, TaskStatus::Completed);
        assert_eq!(rec.progress, 100);
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "a", 1));
        reg.apply(&ev(EventKind::Running, "a", 1));
        assert!(reg.apply(&ev(EventKind::Progress, "a", 1).with_progress(60)));
        assert!(!reg.apply(&ev(EventKind::Progress, "a", 1).with_progress(30)));
        assert!(!reg.apply(&ev(EventKind::Progress, "a", 1).with_progress(60)));
        assert!(reg.apply(&ev(EventKind::Progress, "a", 1).with_progress(250)));
        assert_eq!(reg.snapshot().get("a").unwrap().progress, 100);
    }

    #[test]
    fn progress_ignored_while_pending() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "a", 1));
        assert!(!reg.apply(&ev(EventKind::Progress, "a", 1).with_progress(10)));
        assert_eq!(reg.snapshot().get("a").unwrap().progress, 0);
    }

    #[test]
    fn failure_keeps_last_progress_and_reason() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "e", 1));
        reg.apply(&ev(EventKind::Running, "e", 1));
        reg.apply(&ev(EventKind::Progress, "e", 1).with_progress(50));
        assert!(reg.apply(&ev(EventKind::Failed, "e", 1).with_reason("boom")));

        let snap = reg.snapshot();
        let rec = snap.get("e").unwrap();
        assert_eq!(rec.status, TaskStatus::Failed);
        assert_eq!(rec.progress, 50);
        assert_eq!(rec.reason.as_deref(), Some("boom"));
    }

    #[test]
    fn cancelled_drops_the_record() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "d", 1));
        assert!(reg.apply(&ev(EventKind::Cancelled, "d", 1)));
        assert!(reg.snapshot().is_empty());
    }

    #[test]
    fn first_terminal_wins() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "a", 1));
        reg.apply(&ev(EventKind::Running, "a", 1));
        assert!(reg.apply(&ev(EventKind::Completed, "a", 1)));
        assert!(!reg.apply(&ev(EventKind::Cancelled, "a", 1)));
        assert!(!reg.apply(&ev(EventKind::Failed, "a", 1)));
        assert_eq!(reg.status("a"), Some(TaskStatus::Completed));
    }

    #[test]
    fn stale_epoch_is_rejected() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "a", 1));
        reg.apply(&ev(EventKind::Cancelled, "a", 1));
        reg.apply(&ev(EventKind::Pending, "a", 2));
        reg.apply(&ev(EventKind::Running, "a", 2));

        assert!(!reg.apply(&ev(EventKind::Progress, "a", 1).with_progress(90)));
        assert!(!reg.apply(&ev(EventKind::Completed, "a", 1)));
        let snap = reg.snapshot();
        let rec = snap.get("a").unwrap();
        assert_eq!(rec.status, TaskStatus::Running);
        assert_eq!(rec.progress, 0);
        assert_eq!(rec.epoch, 2);
    }

    #[test]
    fn cleared_only_removes_finished_records() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "a", 1));
        assert!(!reg.apply(&Event::new(EventKind::Cleared).with_task("a")));
        reg.apply(&ev(EventKind::Running, "a", 1));
        reg.apply(&ev(EventKind::Completed, "a", 1));
        assert!(reg.apply(&Event::new(EventKind::Cleared).with_task("a")));
        assert!(reg.snapshot().is_empty());
    }

    #[test]
    fn version_counts_applied_events() {
        let mut reg = Registry::new();
        assert_eq!(reg.snapshot().version(), 0);
        reg.apply(&ev(EventKind::Pending, "a", 1));
        assert_eq!(reg.snapshot().version(), 1);

        assert!(!reg.apply(&ev(EventKind::Completed, "a", 1)));
        assert_eq!(reg.snapshot().version(), 1);
    }

    #[test]
    fn version_grows_when_events_arrive_out_of_seq_order() {
        let mut reg = Registry::new();
        reg.apply(&ev(EventKind::Pending, "a", 1));
        reg.apply(&ev(EventKind::Running, "a", 1));
        reg.apply(&ev(EventKind::Completed, "a", 1));

        // built first, applied last
        let early_clear = Event::new(EventKind::Cleared).with_task("a");
        let late_pending = ev(EventKind::Pending, "b", 2);
        assert!(late_pending.seq > early_clear.seq);

        assert!(reg.apply(&late_pending));
        let before = reg.snapshot().version();
        assert!(reg.apply(&early_clear));
        let after = reg.snapshot();
        assert_eq!(after.version(), before + 1);
        assert!(after.get("a").is_none());
    }
}
