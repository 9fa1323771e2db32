//! In-process hierarchical metrics collection.
//!
//! A tree of named metric scopes, each able to record counters, scalar values,
//! and timed intervals against dotted keys, with every recorded event
//! propagating upward so that ancestors aggregate the activity of their whole
//! subtree. There is no external metrics backend, no persistence and no
//! background scheduling: everything is a synchronous, in-memory data
//! structure intended for lightweight application instrumentation.
//!
//! # The dual model
//!
//! Each scope maintains two consistent views of its activity:
//!
//! * an ordered, append-only **event log** of [`MetricEvent`] records, and
//! * an **aggregate** of current values, addressed by dotted paths.
//!
//! The aggregate is always exactly the fold of the scope's own log. Because
//! every event recorded on a descendant is also appended to each ancestor's
//! log, an ancestor's aggregate reflects descendant activity too, without any
//! separate merge step.
//!
//! # Recording
//!
//! ```
//! use scoped_metrics::{Metrics, Value};
//!
//! let metrics = Metrics::new("db").unwrap();
//!
//! metrics.inc("queries");
//! metrics.inc("queries");
//! metrics.set("pool.size", 10);
//!
//! assert_eq!(metrics.get("queries"), Some(Value::Int(2)));
//! assert_eq!(metrics.get("pool.size"), Some(Value::Int(10)));
//! ```
//!
//! # Hierarchy
//!
//! Scopes are extended into children; children forward every event to their
//! ancestors. The emitting scope's name travels with the event as its
//! `source`, so ancestors can tell descendant streams apart:
//!
//! ```
//! use scoped_metrics::{EventFilter, Metrics, Value};
//!
//! let app = Metrics::new("app").unwrap();
//! let swarm = app.extend("swarm").unwrap();
//!
//! swarm.inc("peers");
//!
//! assert_eq!(app.get("peers"), Some(Value::Int(1)));
//! assert_eq!(
//!     app.filter(&EventFilter::new().source("swarm").key("peers")).len(),
//!     1
//! );
//! ```
//!
//! A process-wide tree is available through [`root()`] and the [`scoped()`]
//! factory for hosts that want one shared instrumentation tree rather than
//! passing handles around.
//!
//! # Timers
//!
//! [`Metrics::start()`] returns a [`Timer`] whose `end()` records a period
//! event carrying the elapsed wall-clock duration, stamped with the start
//! instant. Periods accumulate as an ordered list under the timer's key:
//!
//! ```
//! use scoped_metrics::Metrics;
//!
//! let metrics = Metrics::new("loader").unwrap();
//!
//! let timer = metrics.start("fetch");
//! // ... the work being measured ...
//! timer.end();
//!
//! let fetches = metrics.get("fetch").unwrap();
//! assert_eq!(fetches.as_periods().unwrap().len(), 1);
//! ```
//!
//! # Subscriptions
//!
//! [`Metrics::on()`] registers a synchronous listener scoped to one node;
//! because propagation walks to the root, a listener also observes every
//! descendant event. The same [`EventFilter`] drives both listeners and
//! point-in-time log snapshots via [`Metrics::filter()`].
//!
//! # Clocks
//!
//! Timestamps come from a [`Clock`] shared by the whole tree, defaulting to
//! the system wall clock. Tests inject a [`ManualClock`] for deterministic
//! timestamps and durations; see its documentation for an example.
//!
//! # Thread safety
//!
//! All types are `Send + Sync`. Recordings within one tree are serialized by
//! a single tree-wide lock covering the entire propagation walk; see
//! [`Metrics`] for the resulting re-entrancy rule for listener handlers.
//!
//! # Panic policy
//!
//! Library operations do not panic on valid inputs; invalid scope names are
//! reported as [`Error`] values. Counter arithmetic wraps rather than panics
//! near `i64` boundaries. Panics from listener handlers are not caught; they
//! propagate out of the recording call, and the tree remains usable after.

mod clock;
mod constants;
mod error;
mod event;
mod global;
mod matcher;
mod naming;
mod properties;
mod scope;
mod timer;
mod value;

pub use clock::*;
pub(crate) use constants::*;
pub use error::*;
pub use event::*;
pub use global::*;
pub use matcher::*;
pub use naming::*;
pub use properties::*;
pub use scope::*;
pub use timer::*;
pub use value::*;
