//! # Event channel into the aggregator.
//!
//! [`Bus`] wraps an unbounded `mpsc` sender. Many publishers, exactly one
//! consumer (the aggregator), so every state change is applied by a single
//! writer in arrival order.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                    Consumer (one):
//!   Scheduler ──┐
//!   Runner N  ──┼──────► Bus ───────► Aggregator ───► Snapshot + SubscriberSet
//!   Workers   ──┘   (mpsc, unbounded)
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never awaits and never fails.
//! - **Lossless**: unbounded, so no lifecycle transition is ever dropped.
//! - **Per-publisher FIFO**: events sent from one task arrive in send order.
//! - **Closed consumer**: events are silently discarded once the aggregator exits.

use tokio::sync::mpsc;

use super::event::Event;

/// Sending half of the event channel. Cheap to clone.
#[derive(Clone, Debug)]
pub(crate) struct Bus {
    tx: mpsc::UnboundedSender<Event>,
}

impl Bus {
    /// Creates the bus and the receiver the aggregator consumes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Publishes an event to the aggregator.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a handle that does not keep the channel open.
    pub fn downgrade(&self) -> WeakBus {
        WeakBus {
            tx: self.tx.downgrade(),
        }
    }
}

/// Non-owning bus handle.
///
/// Used by components the aggregator itself owns (subscriber workers), so the
/// channel closes once every real publisher is gone.
#[derive(Clone, Debug)]
pub(crate) struct WeakBus {
    tx: mpsc::WeakUnboundedSender<Event>,
}

impl WeakBus {
    /// Publishes if the channel is still open.
    pub fn publish(&self, ev: Event) {
        if let Some(tx) = self.tx.upgrade() {
            let _ = tx.send(ev);
        }
    }
}
