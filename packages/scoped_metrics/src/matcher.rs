use crate::{EventKind, MetricEvent, type_scope_name};

/// Matches events by an explicit set of optional fields.
///
/// Every field that is present must equal the corresponding event field for
/// the filter to match; an empty filter matches every event. The same
/// matching semantics drive both log snapshots
/// ([`Metrics::filter()`][crate::Metrics::filter]) and live subscriptions
/// ([`Metrics::on()`][crate::Metrics::on]).
///
/// # Example
///
/// ```
/// use scoped_metrics::{EventFilter, EventKind, Metrics};
///
/// let metrics = Metrics::new("db").unwrap();
/// metrics.inc("queries");
/// metrics.set("pool", 10);
///
/// let increments = metrics.filter(&EventFilter::new().kind(EventKind::Increment));
/// assert_eq!(increments.len(), 1);
///
/// // An empty filter matches everything.
/// assert_eq!(metrics.filter(&EventFilter::new()).len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventFilter {
    kind: Option<EventKind>,
    source: Option<String>,
    key: Option<String>,
}

impl EventFilter {
    /// Creates a filter that matches every event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the event kind to equal `kind`.
    #[must_use]
    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Requires the emitting scope's name to equal `source`.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Requires the emitting scope's name to equal the name derived from `T`.
    ///
    /// This is the same derivation [`extend_for`][crate::Metrics::extend_for]
    /// uses, so a filter built from a type matches scopes extended from that
    /// type.
    #[must_use]
    pub fn source_type<T: ?Sized>(self) -> Self {
        self.source(type_scope_name::<T>())
    }

    /// Requires the event key to equal `key`.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Whether `event` satisfies every field present in this filter.
    #[must_use]
    pub fn matches(&self, event: &MetricEvent) -> bool {
        if self.kind.is_some_and(|kind| kind != event.kind()) {
            return false;
        }

        if self
            .source
            .as_deref()
            .is_some_and(|source| source != event.source())
        {
            return false;
        }

        if self.key.as_deref().is_some_and(|key| key != event.key()) {
            return false;
        }

        true
    }
}
