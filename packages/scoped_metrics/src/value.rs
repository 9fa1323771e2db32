use std::time::{Duration, SystemTime};

/// A nested mapping from key segment to value.
///
/// This is the shape of one level of a scope's aggregate state. Intermediate
/// segments of a dotted path each contribute one level of nesting.
pub type ValueMap = foldhash::HashMap<String, Value>;

/// One completed timed interval, as stored in the aggregate under the timer's key.
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodRecord {
    /// The instant the timer was started.
    pub timestamp: SystemTime,

    /// Elapsed wall-clock time between timer start and end. May be zero if the
    /// clock resolution is coarse relative to the measured interval.
    pub duration: Duration,

    /// Caller-supplied attributes merged from timer start and end, if any were given.
    pub custom: Option<ValueMap>,
}

/// A value stored in a scope's aggregate state.
///
/// Counters are [`Value::Int`]; arbitrary scalars set via `set()` use whichever
/// variant their Rust type converts into; timed intervals accumulate as
/// [`Value::Periods`]; intermediate path segments are [`Value::Map`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// Integer scalar; also the representation of counters.
    Int(i64),

    /// Floating-point scalar.
    Float(f64),

    /// Boolean scalar.
    Bool(bool),

    /// String scalar.
    Text(String),

    /// Ordered list of timed intervals, oldest first.
    Periods(Vec<PeriodRecord>),

    /// Nested sub-mapping.
    Map(ValueMap),
}

impl Value {
    /// The integer content, if this is an [`Value::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The period list content, if this is a [`Value::Periods`].
    #[must_use]
    pub fn as_periods(&self) -> Option<&[PeriodRecord]> {
        match self {
            Self::Periods(periods) => Some(periods),
            _ => None,
        }
    }

    /// The nested mapping content, if this is a [`Value::Map`].
    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
