//! # Aggregator: the single writer of the task snapshot.
//!
//! Consumes the [`Bus`](crate::events) in arrival order, folds each event into
//! the registry, and after every applied event publishes the full snapshot:
//! - to a `watch` channel (latest value, for replay and synchronous reads),
//! - to a `broadcast` channel (every snapshot, for [`observe`](crate::TaskQueue::observe)),
//! - and forwards the applied event to the [`SubscriberSet`].
//!
//! ```text
//! Bus ──► Aggregator::run()
//!           ├─► Registry::apply(ev) ── false ──► drop (stale/superseded)
//!           │        │ true
//!           │        ├─► watch.send_replace(snapshot)
//!           │        ├─► broadcast.send(snapshot)
//!           │        ├─► subscribers.emit(ev)
//!           │        └─► Completed/Failed → retention (expiry timer / immediate clear)
//!           └─► expiry fired ──► apply(Cleared{epoch})
//! ```
//!
//! Exits when every publisher is gone, then drains subscriber queues.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::time::DelayQueue;
use tracing::trace;

use crate::config::Retention;
use crate::events::{Event, EventKind};
use crate::state::{Registry, Snapshot, TaskId};
use crate::subscribers::SubscriberSet;

enum Next {
    Event(Event),
    Expired(TaskId, u64),
}

pub(super) struct Aggregator {
    registry: Registry,
    rx: mpsc::UnboundedReceiver<Event>,
    latest: watch::Sender<Arc<Snapshot>>,
    updates: broadcast::Sender<Arc<Snapshot>>,
    subs: SubscriberSet,
    retention: Retention,
    expirations: DelayQueue<(TaskId, u64)>,
}

impl Aggregator {
    pub fn new(
        rx: mpsc::UnboundedReceiver<Event>,
        latest: watch::Sender<Arc<Snapshot>>,
        updates: broadcast::Sender<Arc<Snapshot>>,
        subs: SubscriberSet,
        retention: Retention,
    ) -> Self {
        Self {
            registry: Registry::new(),
            rx,
            latest,
            updates,
            subs,
            retention,
            expirations: DelayQueue::new(),
        }
    }

    /// Spawns the aggregation loop.
    pub fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        loop {
            let next = tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(ev) => Next::Event(ev),
                    None => break,
                },
                Some(expired) = self.expirations.next(), if !self.expirations.is_empty() => {
                    let (id, epoch) = expired.into_inner();
                    Next::Expired(id, epoch)
                }
            };

            match next {
                Next::Event(ev) => self.handle(ev),
                Next::Expired(id, epoch) => self.handle(
                    Event::new(EventKind::Cleared)
                        .with_task(id)
                        .with_epoch(epoch),
                ),
            }
        }
        self.subs.shutdown().await;
    }

    fn handle(&mut self, ev: Event) {
        if ev.task.is_none() {
            // subscriber diagnostics: nothing to fold
            self.subs.emit(&ev);
            return;
        }
        if !self.registry.apply(&ev) {
            trace!(seq = ev.seq, kind = ?ev.kind, task = ?ev.task, "event discarded");
            return;
        }

        self.publish();
        self.subs.emit(&ev);

        if matches!(ev.kind, EventKind::Completed | EventKind::Failed) {
            self.retain(&ev);
        }
    }

    fn retain(&mut self, ev: &Event) {
        let (Some(id), Some(epoch)) = (ev.task.clone(), ev.epoch) else {
            return;
        };
        match self.retention {
            Retention::UntilCleared => {}
            Retention::ExpireAfter(ttl) => {
                self.expirations.insert((id, epoch), ttl);
            }
            Retention::Immediate => self.handle(
                Event::new(EventKind::Cleared)
                    .with_task(id)
                    .with_epoch(epoch),
            ),
        }
    }

    fn publish(&mut self) {
        let snapshot = Arc::new(self.registry.snapshot());
        self.latest.send_replace(Arc::clone(&snapshot));
        // no live observers is fine
        let _ = self.updates.send(snapshot);
    }
}
