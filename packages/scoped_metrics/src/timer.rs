use std::time::{Duration, SystemTime};

use crate::{EventDetails, Metrics, ValueMap};

/// A started timer, produced by [`Metrics::start()`] or
/// [`Metrics::start_with()`].
///
/// Ending the timer records a period event on the scope it was started on,
/// stamped with the *start* instant and carrying the elapsed wall-clock
/// duration. Ending consumes the timer, so it can only fire once; a timer
/// that is dropped instead of ended records nothing, and no timeout ever
/// fires on its behalf.
///
/// The duration saturates to zero if the clock moved backwards while the
/// timer ran, and may legitimately be zero when the clock resolution is
/// coarser than the measured interval.
///
/// # Example
///
/// ```
/// use scoped_metrics::{Metrics, Value};
///
/// let metrics = Metrics::new("loader").unwrap();
///
/// let timer = metrics.start("parse");
/// // ... the work being measured ...
/// timer.end();
///
/// let periods = metrics.get("parse").unwrap();
/// assert_eq!(periods.as_periods().unwrap().len(), 1);
/// ```
#[derive(Debug)]
pub struct Timer {
    scope: Metrics,
    key: String,
    started_at: SystemTime,
    custom_start: Option<ValueMap>,
}

impl Timer {
    pub(crate) fn new(scope: Metrics, key: String, custom_start: Option<ValueMap>) -> Self {
        let started_at = scope.clock_now();

        Self {
            scope,
            key,
            started_at,
            custom_start,
        }
    }

    /// The instant this timer was started, per the scope's clock.
    #[must_use]
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    /// Ends the timer and records the period event.
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder.
    pub fn end(self) {
        self.finish(None);
    }

    /// Ends the timer and records the period event with additional custom
    /// attributes. On key conflicts with attributes given at
    /// [`start_with()`][Metrics::start_with], these win.
    pub fn end_with(self, custom_end: ValueMap) {
        self.finish(Some(custom_end));
    }

    fn finish(self, custom_end: Option<ValueMap>) {
        let now = self.scope.clock_now();
        let duration = now
            .duration_since(self.started_at)
            .unwrap_or(Duration::ZERO);

        // The custom payload exists only if either side supplied attributes.
        let custom = match (self.custom_start, custom_end) {
            (None, None) => None,
            (start, end) => {
                let mut merged = start.unwrap_or_default();
                if let Some(end) = end {
                    merged.extend(end);
                }
                Some(merged)
            }
        };

        self.scope.record(
            self.key,
            EventDetails::Period { duration, custom },
            Some(self.started_at),
        );
    }
}
