//! # Queue configuration.
//!
//! Provides [`QueueConfig`] centralized settings for a [`TaskQueue`](crate::TaskQueue)
//! and [`Retention`], the policy for finished tasks in the published snapshot.
//!
//! ## Sentinel values
//! - `timeout = 0s` → no per-task deadline (treated as `None` by [`QueueConfig::default_timeout`])
//! - `max_concurrency = 0` → **invalid**, rejected by [`QueueConfig::validate`]

use std::time::Duration;

use crate::error::QueueError;

/// What happens to `completed`/`failed` tasks in the published snapshot.
///
/// Cancelled tasks are always dropped immediately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Retention {
    /// Keep them until [`TaskQueue::clear`](crate::TaskQueue::clear) is called.
    #[default]
    UntilCleared,
    /// Remove them automatically after the given duration.
    ExpireAfter(Duration),
    /// Remove them right after the terminal snapshot was published.
    Immediate,
}

/// Configuration for a task queue.
///
/// ## Field semantics
/// - `max_concurrency`: Maximum number of tasks in `running` at once (must be `>= 1`)
/// - `bus_capacity`: Snapshot broadcast ring size; slower observers skip to newer snapshots
/// - `timeout`: Default per-task deadline (`0s` = none)
/// - `grace`: Maximum wait for work functions to exit during shutdown
/// - `retention`: Lifetime of finished tasks in the snapshot
#[derive(Clone, Debug)]
pub struct QueueConfig {
    /// Maximum number of concurrently running tasks.
    pub max_concurrency: usize,

    /// Capacity of the snapshot broadcast channel.
    ///
    /// Observers that lag behind more than `bus_capacity` snapshots skip the
    /// older ones. Minimum value is 1.
    pub bus_capacity: usize,

    /// Default task deadline.
    ///
    /// - `Duration::ZERO` = no deadline
    /// - `> 0` = the task fails with a timeout once exceeded
    ///
    /// Can be overridden per task with [`TaskSpec::with_timeout`](crate::TaskSpec::with_timeout).
    pub timeout: Duration,

    /// Maximum time [`TaskQueue::shutdown`](crate::TaskQueue::shutdown) waits for work to exit.
    pub grace: Duration,

    /// Retention of finished tasks in the snapshot.
    pub retention: Retention,
}

impl QueueConfig {
    /// Default configuration with the given concurrency limit.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency,
            ..Self::default()
        }
    }

    /// Checks the configuration.
    ///
    /// # Example
    /// ```
    /// use taskqueue::{QueueConfig, QueueError};
    ///
    /// assert!(QueueConfig::new(2).validate().is_ok());
    /// assert!(matches!(
    ///     QueueConfig::new(0).validate(),
    ///     Err(QueueError::Configuration { .. })
    /// ));
    /// ```
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.max_concurrency == 0 {
            return Err(QueueError::Configuration {
                reason: "max_concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the default per-task deadline as an `Option`.
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for QueueConfig {
    /// Default configuration:
    ///
    /// - `max_concurrency = 4`
    /// - `bus_capacity = 1024`
    /// - `timeout = 0s` (no deadline)
    /// - `grace = 30s`
    /// - `retention = Retention::UntilCleared`
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            bus_capacity: 1024,
            timeout: Duration::ZERO,
            grace: Duration::from_secs(30),
            retention: Retention::default(),
        }
    }
}
