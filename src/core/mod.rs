//! Queue core: admission, execution, aggregation.
//!
//! The only public API from this module is [`TaskQueue`] and its builder.
//!
//! Internal modules:
//! - [`scheduler`]: FIFO admission under the concurrency limit, cancellation, terminal tie-break;
//! - [`runner`]: executes one admitted task (deadline, panic isolation, cancellation);
//! - [`aggregator`]: single writer of the snapshot, fan-out to observers and subscribers;
//! - [`queue`]: public facade;
//! - [`builder`]: wiring.

mod aggregator;
mod builder;
mod queue;
mod runner;
mod scheduler;

pub use builder::TaskQueueBuilder;
pub use queue::TaskQueue;
