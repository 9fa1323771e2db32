use foldhash::HashMapExt;

use crate::{PeriodRecord, Value, ValueMap};

/// Nested key-value store addressed by dotted paths.
///
/// A path like `"net.requests"` names the `requests` entry inside the `net`
/// sub-mapping; writing it creates intermediate [`Value::Map`] levels as
/// needed. This is the aggregate half of a scope's dual model: the scope
/// folds its event log into one of these.
///
/// # Thread safety
///
/// This type has no internal synchronization. The scope tree serializes all
/// access to it; standalone users must do the same.
///
/// # Example
///
/// ```
/// use scoped_metrics::{Properties, Value};
///
/// let mut properties = Properties::new();
/// properties.increment("net.requests");
/// properties.increment("net.requests");
/// properties.set("net.status", Some(Value::from("ready")));
///
/// assert_eq!(properties.get("net.requests"), Some(&Value::Int(2)));
/// ```
#[derive(Debug, Default)]
pub struct Properties {
    root: ValueMap,
}

impl Properties {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: ValueMap::new(),
        }
    }

    /// Returns the current value at `path`, or `None` if the path was never
    /// set, was deleted, or traverses a scalar where a sub-mapping would be
    /// required.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        let mut segments = path.split('.').peekable();

        loop {
            let segment = segments.next()?;

            if segments.peek().is_none() {
                return current.get(segment);
            }

            current = current.get(segment)?.as_map()?;
        }
    }

    /// Sets `path` to `value`, creating intermediate sub-mappings as needed.
    ///
    /// A `None` value behaves exactly as [`delete()`](Self::delete). A scalar
    /// found where an intermediate mapping is required is replaced by a
    /// mapping (last write wins; mixing a key as both leaf and branch is a
    /// caller error).
    pub fn set(&mut self, path: &str, value: Option<Value>) {
        match value {
            Some(value) => set_in(&mut self.root, path, value),
            None => self.delete(path),
        }
    }

    /// Removes `path` from the store.
    ///
    /// Intermediate sub-mappings left empty by the removal are pruned, so a
    /// deleted branch is indistinguishable from one that was never written.
    pub fn delete(&mut self, path: &str) {
        delete_in(&mut self.root, path);
    }

    /// Adds one to the integer at `path`, treating an absent value as 0.
    ///
    /// A non-integer existing value is a caller error and is likewise treated
    /// as 0 (it gets overwritten).
    pub fn increment(&mut self, path: &str) {
        self.add(path, 1);
    }

    /// Subtracts one from the integer at `path`, treating an absent value as 0.
    pub fn decrement(&mut self, path: &str) {
        self.add(path, -1);
    }

    fn add(&mut self, path: &str, delta: i64) {
        // Counter arithmetic wraps rather than panics; values anywhere near
        // i64 boundaries are already mangled data as far as metrics go.
        let current = self.get(path).and_then(Value::as_int).unwrap_or(0);
        set_in(&mut self.root, path, Value::Int(current.wrapping_add(delta)));
    }

    /// Appends `record` to the period list at `path`, starting a fresh list if
    /// the path is absent. List order equals call order.
    ///
    /// A non-list existing value is a caller error and is replaced by a fresh
    /// single-entry list.
    pub fn append(&mut self, path: &str, record: PeriodRecord) {
        append_in(&mut self.root, path, record);
    }

    /// Resets the whole store to empty. Idempotent.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// A snapshot of the whole store.
    #[must_use]
    pub fn values(&self) -> ValueMap {
        self.root.clone()
    }

    /// Whether the store currently holds no values at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

fn set_in(map: &mut ValueMap, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .and_modify(|existing| {
                    if existing.as_map().is_none() {
                        *existing = Value::Map(ValueMap::new());
                    }
                })
                .or_insert_with(|| Value::Map(ValueMap::new()));

            if let Value::Map(inner) = entry {
                set_in(inner, rest, value);
            }
        }
    }
}

// Pushes in place at the leaf; the accumulated list is never rebuilt.
fn append_in(map: &mut ValueMap, path: &str, record: PeriodRecord) {
    match path.split_once('.') {
        None => {
            let entry = map
                .entry(path.to_string())
                .or_insert_with(|| Value::Periods(Vec::new()));

            match entry {
                Value::Periods(periods) => periods.push(record),
                other => *other = Value::Periods(vec![record]),
            }
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_string())
                .and_modify(|existing| {
                    if existing.as_map().is_none() {
                        *existing = Value::Map(ValueMap::new());
                    }
                })
                .or_insert_with(|| Value::Map(ValueMap::new()));

            if let Value::Map(inner) = entry {
                append_in(inner, rest, record);
            }
        }
    }
}

fn delete_in(map: &mut ValueMap, path: &str) {
    match path.split_once('.') {
        None => {
            map.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Value::Map(inner)) = map.get_mut(head) {
                delete_in(inner, rest);

                if inner.is_empty() {
                    map.remove(head);
                }
            }
        }
    }
}
