#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::timeout;

use taskqueue::{Event, EventKind, Snapshot, Subscribe, TaskContext, TaskError, TaskQueue, WorkFn, WorkRef};

pub const WAIT: Duration = Duration::from_secs(5);

/// Records every task lifecycle event it receives, in delivery order.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<(String, EventKind)>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Lifecycle kinds seen for `id`, progress events excluded.
    pub fn states(&self, id: &str) -> Vec<EventKind> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(task, kind)| task == id && *kind != EventKind::Progress)
            .map(|(_, kind)| *kind)
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|(task, _)| task.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Waits until `kind` was recorded for `id`.
    pub async fn wait_for(&self, id: &str, kind: EventKind) {
        timeout(WAIT, async {
            while !self.states(id).contains(&kind) {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("{id} never reached {kind:?}; saw {:?}", self.states(id)));
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, event: &Event) {
        if let Some(task) = &event.task {
            self.events
                .lock()
                .unwrap()
                .push((task.to_string(), event.kind));
        }
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// Work that completes once `gate` is notified.
pub fn gated(gate: &Arc<Notify>) -> WorkRef {
    let gate = Arc::clone(gate);
    WorkFn::arc(move |_ctx: TaskContext| {
        let gate = Arc::clone(&gate);
        async move {
            gate.notified().await;
            Ok::<(), TaskError>(())
        }
    })
}

/// Work that reports full progress after `delay`.
pub fn sleepy(delay: Duration) -> WorkRef {
    WorkFn::arc(move |ctx: TaskContext| async move {
        tokio::time::sleep(delay).await;
        ctx.progress(100);
        Ok::<(), TaskError>(())
    })
}

/// Waits for a snapshot matching `pred`, failing the test after [`WAIT`].
pub async fn until<F>(queue: &TaskQueue, pred: F) -> Arc<Snapshot>
where
    F: FnMut(&Snapshot) -> bool,
{
    timeout(WAIT, queue.wait_until(pred))
        .await
        .expect("snapshot condition not reached in time")
        .expect("aggregator is gone")
}
