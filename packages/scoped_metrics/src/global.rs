use std::sync::OnceLock;

use crate::{Metrics, Result};

static ROOT: OnceLock<Metrics> = OnceLock::new();

/// The process-wide root scope.
///
/// Created on first access and alive for the rest of the process; every scope
/// created via [`scoped()`] hangs off it, so the root's log and aggregate see
/// the whole process's recorded activity.
///
/// # Example
///
/// ```
/// use scoped_metrics::{EventFilter, root, scoped};
///
/// let connections = scoped("connections").unwrap();
/// connections.inc("opened");
///
/// let from_connections = root().filter(&EventFilter::new().source("connections"));
/// assert!(!from_connections.is_empty());
/// ```
pub fn root() -> &'static Metrics {
    ROOT.get_or_init(|| {
        Metrics::new("root").expect("the root scope name is a non-empty constant")
    })
}

/// Creates a new child scope of the process-wide root.
///
/// Equivalent to `root().extend(name)`.
pub fn scoped(name: impl Into<String>) -> Result<Metrics> {
    root().extend(name)
}
