//! Lifecycle events: data model and the channel feeding the aggregator.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::mpsc::unbounded_channel`
//!
//! ## Quick reference
//! - **Publishers**: scheduler (pending/running/terminal/cancelled), runner
//!   progress via [`TaskContext`](crate::TaskContext), `SubscriberSet` workers
//!   (overflow/panic).
//! - **Consumer**: the aggregator, alone. It folds events into the snapshot and
//!   forwards applied ones to subscribers.

mod bus;
mod event;

pub use event::{Event, EventKind};

pub(crate) use bus::{Bus, WeakBus};
