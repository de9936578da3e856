//! # Event subscribers.
//!
//! Subscribers see every lifecycle event the aggregator **applied** (stale or
//! superseded events never reach them), plus fan-out diagnostics.
//! Snapshot observers use [`TaskQueue::observe`](crate::TaskQueue::observe) instead.
//!
//! ## Architecture
//! ```text
//! Aggregator ── apply(Event) ──► SubscriberSet::emit(&Event)
//!                                    ├──► [queue S1] ─► worker S1 ─► on_event()
//!                                    ├──► [queue S2] ─► worker S2 ─► on_event()
//!                                    └──► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use taskqueue::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::Failed {
//!             // increment failure counter
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub(crate) use set::describe_panic;
pub use subscribe::Subscribe;
