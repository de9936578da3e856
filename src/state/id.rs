use std::fmt;
use std::sync::Arc;

/// Identity of a submitted task.
///
/// Immutable once assigned. Cheap to clone (`Arc<str>` inside).
///
/// # Example
/// ```
/// use taskqueue::TaskId;
///
/// let a = TaskId::from("upload-1");
/// assert_eq!(a.as_str(), "upload-1");
///
/// let b = TaskId::generate();
/// assert!(b.as_str().starts_with("task_"));
/// assert_ne!(b, TaskId::generate());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Arc<str>);

impl TaskId {
    /// Creates an identity from any string-like value.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh, lexicographically time-ordered identity.
    pub fn generate() -> Self {
        Self::new(format!("task_{}", ulid::Ulid::new()))
    }

    /// Returns the identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&TaskId> for TaskId {
    fn from(id: &TaskId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
