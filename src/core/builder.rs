use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use crate::{
    config::QueueConfig,
    error::QueueError,
    events::Bus,
    state::Snapshot,
    subscribers::{Subscribe, SubscriberSet},
};

use super::{aggregator::Aggregator, queue::TaskQueue, scheduler::Scheduler};

/// Builder for constructing a [`TaskQueue`] with optional subscribers.
pub struct TaskQueueBuilder {
    cfg: QueueConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl TaskQueueBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: QueueConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every applied lifecycle event through dedicated
    /// workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the configuration and starts the queue.
    ///
    /// Initializes:
    /// - the event bus feeding the aggregator
    /// - subscriber workers
    /// - the aggregator task (spawned; requires a tokio runtime)
    /// - the scheduler
    pub fn build(self) -> Result<TaskQueue, QueueError> {
        self.cfg.validate()?;

        let (bus, rx) = Bus::new();
        let subs = SubscriberSet::new(self.subscribers, bus.downgrade());
        let (latest_tx, latest_rx) = watch::channel(Arc::new(Snapshot::default()));
        let (updates, _) = broadcast::channel(self.cfg.bus_capacity_clamped());

        Aggregator::new(rx, latest_tx, updates.clone(), subs, self.cfg.retention).spawn();

        let scheduler = Scheduler::new(self.cfg.max_concurrency, self.cfg.default_timeout(), bus);
        Ok(TaskQueue::new_internal(self.cfg, scheduler, latest_rx, updates))
    }
}
