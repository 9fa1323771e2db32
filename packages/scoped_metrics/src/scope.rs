use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::SystemTime;

use crate::{
    Clock, ERR_POISONED_LOCK, Error, EventDetails, EventFilter, MetricEvent, PeriodRecord,
    Properties, Result, Timer, Value, ValueMap, type_scope_name,
};

/// One scope in a tree of metrics scopes.
///
/// A scope records counters, scalar values, and timed intervals against dotted
/// keys. Every recorded event is appended to the scope's own ordered log,
/// folded into its aggregate state, dispatched to its listeners, and then
/// forwarded unchanged to the parent scope, which repeats the same steps up to
/// the tree root. An ancestor's aggregate therefore reflects all descendant
/// activity, purely because descendant events land in its own log.
///
/// `Metrics` is a cheap cloneable handle; clones refer to the same scope.
/// A scope owns its children, while its link to the parent is non-owning:
/// dropping every handle to a parent stops propagation there, nothing more.
///
/// # Example
///
/// ```
/// use scoped_metrics::{EventFilter, Metrics, Value};
///
/// let root = Metrics::new("app").unwrap();
/// let db = root.extend("db").unwrap();
///
/// db.inc("queries");
/// db.inc("queries");
/// db.dec("queries");
///
/// assert_eq!(db.get("queries"), Some(Value::Int(1)));
///
/// // The events also propagated into the parent's log and aggregate.
/// assert_eq!(root.get("queries"), Some(Value::Int(1)));
/// assert_eq!(root.filter(&EventFilter::new().source("db")).len(), 3);
/// ```
///
/// # Thread safety
///
/// Handles may be shared freely across threads. All recordings within one
/// tree are serialized by a single tree-wide lock, so the whole
/// append/fold/dispatch/forward walk of one recording is atomic with respect
/// to every other recording in the tree. Because listeners run inside that
/// walk, a handler must not record into (or reset a scope of) the same tree:
/// doing so deadlocks. Handlers may freely read state and register or cancel
/// listeners.
///
/// # Panic policy
///
/// Recording operations do not panic for mathematical reasons; counters wrap
/// near `i64` boundaries. A panicking listener handler is not caught: it
/// propagates to the caller of the recording operation and aborts forwarding
/// to any ancestors not yet processed. The tree itself stays usable; later
/// recordings and resets proceed normally.
#[derive(Clone)]
pub struct Metrics {
    node: Arc<ScopeNode>,
}

pub(crate) struct ScopeNode {
    name: String,
    parent: Weak<ScopeNode>,
    clock: Clock,

    // One lock per tree, shared by every node, so a recording's walk over the
    // whole ancestor chain is atomic with respect to other recordings.
    record_lock: Arc<Mutex<()>>,

    state: Mutex<ScopeState>,
    children: Mutex<Vec<Arc<ScopeNode>>>,
    listeners: Mutex<ListenerTable>,
}

/// The dual model: the ordered event log and the aggregate derived from it.
/// At any instant the aggregate equals the fold of exactly this log.
#[derive(Default)]
struct ScopeState {
    log: Vec<Arc<MetricEvent>>,
    properties: Properties,
}

type Handler = Arc<dyn Fn(&MetricEvent) + Send + Sync>;

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

struct ListenerEntry {
    id: u64,
    filter: EventFilter,
    handler: Handler,
}

impl Metrics {
    /// Creates the root scope of a new, standalone tree using the system clock.
    ///
    /// Most application code should instead use the process-wide tree via
    /// [`root()`][crate::root] / [`scoped()`][crate::scoped]; standalone trees
    /// are primarily useful in tests and embedded hosts.
    ///
    /// Fails with [`Error::EmptyScopeName`] if `name` is empty.
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_clock(name, Clock::system())
    }

    /// Creates the root scope of a new, standalone tree using the given clock.
    ///
    /// Every scope later extended from this one inherits the clock.
    pub fn with_clock(name: impl Into<String>, clock: Clock) -> Result<Self> {
        Self::construct(name.into(), Weak::new(), clock, Arc::new(Mutex::new(())))
    }

    fn construct(
        name: String,
        parent: Weak<ScopeNode>,
        clock: Clock,
        record_lock: Arc<Mutex<()>>,
    ) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::EmptyScopeName);
        }

        Ok(Self {
            node: Arc::new(ScopeNode {
                name,
                parent,
                clock,
                record_lock,
                state: Mutex::new(ScopeState::default()),
                children: Mutex::new(Vec::new()),
                listeners: Mutex::new(ListenerTable::default()),
            }),
        })
    }

    /// Creates a child scope named `name` and appends it to this scope's
    /// children. O(1).
    ///
    /// Child names need not be unique, neither among siblings nor across the
    /// tree. Fails with [`Error::EmptyScopeName`] if `name` is empty, in which
    /// case nothing is mutated.
    pub fn extend(&self, name: impl Into<String>) -> Result<Self> {
        let child = Self::construct(
            name.into(),
            Arc::downgrade(&self.node),
            self.node.clock.clone(),
            Arc::clone(&self.node.record_lock),
        )?;

        self.node
            .children
            .lock()
            .expect(ERR_POISONED_LOCK)
            .push(Arc::clone(&child.node));

        Ok(child)
    }

    /// Creates a child scope named after the type `T`, via
    /// [`type_scope_name`].
    ///
    /// # Example
    ///
    /// ```
    /// use scoped_metrics::Metrics;
    ///
    /// struct Replicator;
    ///
    /// let root = Metrics::new("app").unwrap();
    /// let metrics = root.extend_for::<Replicator>();
    /// assert_eq!(metrics.name(), "Replicator");
    /// ```
    #[must_use]
    pub fn extend_for<T: ?Sized>(&self) -> Self {
        self.extend(type_scope_name::<T>())
            .expect("type-derived scope names are never empty")
    }

    /// The name of this scope, as it appears in the `source` field of events
    /// recorded here.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Clears this scope's own log and aggregate.
    ///
    /// Listeners and children are untouched, as are ancestors: events this
    /// scope already propagated upward stay in the ancestors' logs.
    pub fn reset(&self) {
        // Serialize with recordings so a reset never lands in the middle of a
        // propagation walk. The lock guards no data of its own, so a poison
        // left behind by a panicking listener is cleared rather than spread.
        let _guard = self
            .node
            .record_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut state = self.node.state.lock().expect(ERR_POISONED_LOCK);
        state.log.clear();
        state.properties.clear();
    }

    /// Increments the counter at `key`.
    pub fn inc(&self, key: impl Into<String>) {
        self.record(key.into(), EventDetails::Increment, None);
    }

    /// Decrements the counter at `key`.
    pub fn dec(&self, key: impl Into<String>) {
        self.record(key.into(), EventDetails::Decrement, None);
    }

    /// Sets the value at `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.record(
            key.into(),
            EventDetails::SetValue {
                value: Some(value.into()),
            },
            None,
        );
    }

    /// Sets or clears the value at `key`: a `None` value has exactly the
    /// semantics of [`delete()`][Self::delete], recorded as a set event with
    /// an absent value.
    pub fn set_opt(&self, key: impl Into<String>, value: Option<Value>) {
        self.record(key.into(), EventDetails::SetValue { value }, None);
    }

    /// Deletes the value at `key`.
    pub fn delete(&self, key: impl Into<String>) {
        self.record(key.into(), EventDetails::DeleteKey, None);
    }

    /// Starts a timer for `key`.
    ///
    /// Nothing is recorded until the returned [`Timer`] is ended; a dropped
    /// timer records nothing at all.
    #[must_use]
    pub fn start(&self, key: impl Into<String>) -> Timer {
        Timer::new(self.clone(), key.into(), None)
    }

    /// Starts a timer for `key` with custom attributes to attach to the
    /// eventual period event. Attributes supplied at
    /// [`end_with()`][Timer::end_with] win over these on key conflicts.
    #[must_use]
    pub fn start_with(&self, key: impl Into<String>, custom: ValueMap) -> Timer {
        Timer::new(self.clone(), key.into(), Some(custom))
    }

    /// A point-in-time snapshot of this scope's own log entries matching
    /// `filter`, in recording order.
    ///
    /// The log already contains every event propagated from descendants, so
    /// filtering by [`source`][EventFilter::source] is how descendant
    /// activity is told apart from the scope's own.
    #[must_use]
    pub fn filter(&self, filter: &EventFilter) -> Vec<Arc<MetricEvent>> {
        let state = self.node.state.lock().expect(ERR_POISONED_LOCK);

        state
            .log
            .iter()
            .filter(|event| filter.matches(event.as_ref()))
            .cloned()
            .collect()
    }

    /// The number of events currently in this scope's own log.
    #[must_use]
    pub fn log_len(&self) -> usize {
        self.node.state.lock().expect(ERR_POISONED_LOCK).log.len()
    }

    /// Registers `handler` to be invoked synchronously, once per event
    /// matching `filter` recorded at this scope or any descendant.
    ///
    /// Handlers fire in registration order, after the event has been folded
    /// into this scope's aggregate. The returned [`Subscription`] cancels the
    /// registration; merely dropping it leaves the listener active for the
    /// life of the scope.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// use scoped_metrics::{EventFilter, Metrics};
    ///
    /// let metrics = Metrics::new("net").unwrap();
    /// let seen = Arc::new(AtomicUsize::new(0));
    ///
    /// let subscription = {
    ///     let seen = Arc::clone(&seen);
    ///     metrics.on(EventFilter::new().key("errors"), move |_event| {
    ///         seen.fetch_add(1, Ordering::Relaxed);
    ///     })
    /// };
    ///
    /// metrics.inc("errors");
    /// metrics.inc("requests"); // Does not match.
    /// subscription.cancel();
    /// metrics.inc("errors"); // No longer registered.
    ///
    /// assert_eq!(seen.load(Ordering::Relaxed), 1);
    /// ```
    pub fn on(
        &self,
        filter: EventFilter,
        handler: impl Fn(&MetricEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let mut listeners = self.node.listeners.lock().expect(ERR_POISONED_LOCK);

        let id = listeners.next_id;
        listeners.next_id += 1;

        listeners.entries.push(ListenerEntry {
            id,
            filter,
            handler: Arc::new(handler),
        });

        Subscription {
            node: Arc::downgrade(&self.node),
            id,
        }
    }

    /// A snapshot of this scope's own aggregate state.
    #[must_use]
    pub fn values(&self) -> ValueMap {
        self.node
            .state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .properties
            .values()
    }

    /// The current aggregate value at the dotted path `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.node
            .state
            .lock()
            .expect(ERR_POISONED_LOCK)
            .properties
            .get(key)
            .cloned()
    }

    /// The set of descendant scope names, recursively.
    ///
    /// Derived from the children on every call; never cached.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<String> {
        let mut tags = BTreeSet::new();
        self.node.collect_tags(&mut tags);
        tags
    }

    pub(crate) fn clock_now(&self) -> SystemTime {
        self.node.clock.now()
    }

    /// The shared recording path: builds the event, then walks it from this
    /// node to the root, at each node appending to the log, folding into the
    /// aggregate and dispatching to listeners.
    pub(crate) fn record(
        &self,
        key: String,
        details: EventDetails,
        timestamp: Option<SystemTime>,
    ) {
        let event = Arc::new(MetricEvent {
            source: self.node.name.clone(),
            key,
            timestamp: timestamp.unwrap_or_else(|| self.node.clock.now()),
            details,
        });

        // The guard covers the whole walk. It protects no data of its own
        // (each node's state has its own mutex, released before handlers
        // run), so a poison left behind by a panicking listener is cleared
        // rather than spread to later recordings.
        let _guard = self
            .node
            .record_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut node = Some(Arc::clone(&self.node));
        while let Some(current) = node {
            current.absorb(&event);
            node = current.parent.upgrade();
        }
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("name", &self.node.name)
            .finish_non_exhaustive()
    }
}

impl ScopeNode {
    fn absorb(&self, event: &Arc<MetricEvent>) {
        {
            let mut state = self.state.lock().expect(ERR_POISONED_LOCK);
            state.log.push(Arc::clone(event));
            state.apply(event);
        }

        // Snapshot the matching handlers before invoking any, so a handler can
        // register or cancel listeners on this very scope without deadlocking
        // on the table lock. A cancellation performed inside a handler takes
        // effect from the next recording onward.
        let matching: Vec<Handler> = {
            let listeners = self.listeners.lock().expect(ERR_POISONED_LOCK);
            listeners
                .entries
                .iter()
                .filter(|entry| entry.filter.matches(event))
                .map(|entry| Arc::clone(&entry.handler))
                .collect()
        };

        for handler in matching {
            handler(event);
        }
    }

    fn collect_tags(&self, tags: &mut BTreeSet<String>) {
        let children = self.children.lock().expect(ERR_POISONED_LOCK);

        for child in children.iter() {
            tags.insert(child.name.clone());
            child.collect_tags(tags);
        }
    }
}

impl ScopeState {
    /// Folds one event into the aggregate. Exhaustive by construction: there
    /// is no unknown event kind to fail on.
    fn apply(&mut self, event: &MetricEvent) {
        match &event.details {
            EventDetails::Increment => self.properties.increment(&event.key),
            EventDetails::Decrement => self.properties.decrement(&event.key),
            EventDetails::SetValue { value } => self.properties.set(&event.key, value.clone()),
            EventDetails::DeleteKey => self.properties.delete(&event.key),
            EventDetails::Period { duration, custom } => self.properties.append(
                &event.key,
                PeriodRecord {
                    timestamp: event.timestamp,
                    duration: *duration,
                    custom: custom.clone(),
                },
            ),
        }
    }
}

/// Cancels a listener registration made with [`Metrics::on()`].
///
/// [`cancel()`][Self::cancel] is idempotent and permanent: once canceled, the
/// handler never fires again and its table entry is removed. Dropping a
/// `Subscription` without canceling leaves the listener registered.
#[derive(Debug)]
pub struct Subscription {
    node: Weak<ScopeNode>,
    id: u64,
}

impl Subscription {
    /// Permanently removes this registration. Calling it again is a no-op.
    pub fn cancel(&self) {
        if let Some(node) = self.node.upgrade() {
            node.listeners
                .lock()
                .expect(ERR_POISONED_LOCK)
                .entries
                .retain(|entry| entry.id != self.id);
        }
    }
}
