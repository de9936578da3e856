//! # Process registry: task identity, lifecycle state, and snapshots.
//!
//! Pure data. Nothing in here spawns, locks, or awaits.
//!
//! - [`TaskId`] caller-assigned (or generated) identity
//! - [`TaskStatus`] lifecycle state machine
//! - [`TaskRecord`] current state of one task
//! - [`Snapshot`] immutable mapping of identity to record, published to observers
//! - `Registry` (crate-private) folds events into the authoritative mapping
//!
//! ## Lifecycle
//! ```text
//! Pending ──► Running ──► Completed
//!    │           ├──────► Failed
//!    │           └──────► Cancelled (dropped from snapshot)
//!    └──────────────────► Cancelled (dropped from snapshot)
//! ```

mod id;
mod record;
mod registry;
mod snapshot;

pub use id::TaskId;
pub use record::{TaskRecord, TaskStatus};
pub use snapshot::Snapshot;

pub(crate) use registry::Registry;
