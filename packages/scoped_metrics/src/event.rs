use std::time::{Duration, SystemTime};

use crate::{Value, ValueMap};

/// The kind of a recorded event, without its payload.
///
/// Used by [`EventFilter`][crate::EventFilter] to match events by kind alone.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum EventKind {
    /// A counter was incremented.
    Increment,

    /// A counter was decremented.
    Decrement,

    /// A key was set to a value (or cleared, when the value is absent).
    SetValue,

    /// A key was removed.
    DeleteKey,

    /// A timed interval completed.
    Period,
}

/// The payload of a recorded event.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum EventDetails {
    /// Add one to the counter at the event's key.
    Increment,

    /// Subtract one from the counter at the event's key.
    Decrement,

    /// Overwrite the value at the event's key. An absent value folds exactly
    /// as a [`DeleteKey`][Self::DeleteKey] would.
    SetValue {
        /// The new value, or `None` to clear the key.
        value: Option<Value>,
    },

    /// Remove the value at the event's key.
    DeleteKey,

    /// Append a completed timed interval to the list at the event's key.
    Period {
        /// Elapsed wall-clock time between timer start and end.
        duration: Duration,

        /// Caller-supplied attributes merged from timer start and end,
        /// present only if either side supplied any.
        custom: Option<ValueMap>,
    },
}

impl EventDetails {
    /// The payload-free kind of this payload.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Increment => EventKind::Increment,
            Self::Decrement => EventKind::Decrement,
            Self::SetValue { .. } => EventKind::SetValue,
            Self::DeleteKey => EventKind::DeleteKey,
            Self::Period { .. } => EventKind::Period,
        }
    }
}

/// An immutable record of one recorded action.
///
/// Once recorded, the same event object (shared via `Arc`) is appended to the
/// log of the emitting scope and of every ancestor scope; it is never mutated
/// afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricEvent {
    pub(crate) source: String,
    pub(crate) key: String,
    pub(crate) timestamp: SystemTime,
    pub(crate) details: EventDetails,
}

impl MetricEvent {
    /// The name of the scope the event was recorded on.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The dotted path the event applies to.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The instant the event was recorded or, for a period, the instant the
    /// timer was started.
    #[must_use]
    pub fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The event payload.
    #[must_use]
    pub fn details(&self) -> &EventDetails {
        &self.details
    }

    /// The payload-free kind of the event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.details.kind()
    }

    /// The recorded value, for a [`SetValue`][EventDetails::SetValue] event.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match &self.details {
            EventDetails::SetValue { value } => value.as_ref(),
            _ => None,
        }
    }

    /// The measured duration, for a [`Period`][EventDetails::Period] event.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        match &self.details {
            EventDetails::Period { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    /// The merged custom attributes, for a [`Period`][EventDetails::Period]
    /// event that carries any.
    #[must_use]
    pub fn custom(&self) -> Option<&ValueMap> {
        match &self.details {
            EventDetails::Period { custom, .. } => custom.as_ref(),
            _ => None,
        }
    }
}
