use std::collections::BTreeMap;

use super::{TaskId, TaskRecord, TaskStatus};

/// Immutable view of every tracked task, ordered by identity.
///
/// Produced by the aggregator after each applied event. `version` is the
/// number of events folded into it (`0` for the initial, empty snapshot), so
/// every published snapshot carries exactly one more than the previous one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    version: u64,
    tasks: BTreeMap<TaskId, TaskRecord>,
}

impl Snapshot {
    pub(crate) fn new(version: u64, tasks: BTreeMap<TaskId, TaskRecord>) -> Self {
        Self { version, tasks }
    }

    /// Sequence number of the last applied event.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Looks up one task.
    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.get(id)
    }

    /// Status of one task, if tracked.
    pub fn status(&self, id: &str) -> Option<TaskStatus> {
        self.get(id).map(|r| r.status)
    }

    /// Iterates records in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.tasks.values()
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if no task is tracked.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks currently in `status`.
    pub fn count(&self, status: TaskStatus) -> usize {
        self.iter().filter(|r| r.status == status).count()
    }

    /// Sorted identities of tasks currently in `status`.
    pub fn ids_with(&self, status: TaskStatus) -> Vec<TaskId> {
        self.iter()
            .filter(|r| r.status == status)
            .map(|r| r.id.clone())
            .collect()
    }
}
