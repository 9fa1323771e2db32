use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use crate::ERR_POISONED_LOCK;

/// A time source for event timestamps and timer durations.
///
/// Every scope in a tree shares one clock, inherited from the scope the tree
/// was created from. The default reads the system wall clock; tests and hosts
/// that need deterministic timestamps can inject a [`ManualClock`] instead.
///
/// Wall-clock time is trusted as given. Durations measured across a backwards
/// clock adjustment saturate to zero rather than failing; zero durations are
/// legal in general, since the platform clock resolution may be coarser than
/// the measured interval.
///
/// # Example
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use scoped_metrics::{Clock, EventFilter, ManualClock, Metrics};
///
/// let manual = ManualClock::new(SystemTime::UNIX_EPOCH);
/// let metrics = Metrics::with_clock("test", Clock::manual(&manual)).unwrap();
///
/// let timer = metrics.start("load_ms");
/// manual.advance(Duration::from_millis(250));
/// timer.end();
///
/// let events = metrics.filter(&EventFilter::new());
/// assert_eq!(events[0].duration(), Some(Duration::from_millis(250)));
/// ```
#[derive(Clone, Debug)]
pub struct Clock {
    source: TimeSource,
}

#[derive(Clone, Debug)]
enum TimeSource {
    System,
    Manual(Arc<ManualClock>),
}

impl Clock {
    /// A clock reading the system wall clock.
    #[must_use]
    pub fn system() -> Self {
        Self {
            source: TimeSource::System,
        }
    }

    /// A clock reading the given manually controlled time source.
    #[must_use]
    pub fn manual(clock: &Arc<ManualClock>) -> Self {
        Self {
            source: TimeSource::Manual(Arc::clone(clock)),
        }
    }

    /// The current instant according to this clock.
    #[must_use]
    pub fn now(&self) -> SystemTime {
        match &self.source {
            TimeSource::System => SystemTime::now(),
            TimeSource::Manual(clock) => clock.now(),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

/// A manually controlled time source, for deterministic tests.
///
/// Time only moves when told to via [`advance()`][Self::advance] or
/// [`set()`][Self::set].
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    /// Creates a manual clock reading `start` until told otherwise.
    #[must_use]
    pub fn new(start: SystemTime) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().expect(ERR_POISONED_LOCK);
        *now += duration;
    }

    /// Sets the clock to an absolute instant. The instant may lie before the
    /// current reading; the clock does not enforce monotonicity, matching the
    /// wall clock it stands in for.
    pub fn set(&self, instant: SystemTime) {
        let mut now = self.now.lock().expect(ERR_POISONED_LOCK);
        *now = instant;
    }

    fn now(&self) -> SystemTime {
        *self.now.lock().expect(ERR_POISONED_LOCK)
    }
}
