//! # Work abstractions and submission specs.
//!
//! - [`Work`] trait for async, cancelable units of work
//! - [`WorkFn`] closure-backed implementation
//! - [`WorkRef`] shared reference to work (`Arc<dyn Work>`)
//! - [`TaskContext`] what a running work function sees: identity, cancellation, progress
//! - [`TaskSpec`] identity + work + optional deadline, the unit of submission

mod context;
mod spec;
mod work;
mod work_fn;

pub use context::TaskContext;
pub use spec::TaskSpec;
pub use work::{Work, WorkRef};
pub use work_fn::WorkFn;
