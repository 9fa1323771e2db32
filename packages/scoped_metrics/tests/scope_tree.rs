//! End-to-end tests for the scope tree: recording, propagation, filtering
//! and reset semantics across multiple levels, driven through the public API
//! only.

#![allow(clippy::indexing_slicing, reason = "panic is fine in tests")]

use std::time::{Duration, SystemTime};

use scoped_metrics::{
    Clock, EventFilter, EventKind, ManualClock, Metrics, Value, scoped,
};

#[test]
fn counters_fold_to_inc_minus_dec() {
    let root = Metrics::new("root").unwrap();
    let metrics = root.extend("test").unwrap();

    for _ in 0..5 {
        metrics.inc("foo");
    }
    for _ in 0..2 {
        metrics.dec("foo");
    }

    assert_eq!(metrics.get("foo"), Some(Value::Int(3)));
    assert_eq!(root.get("foo"), Some(Value::Int(3)));

    // The filtered log counts every event against the key, of any kind.
    assert_eq!(metrics.filter(&EventFilter::new().key("foo")).len(), 7);
}

#[test]
fn set_history_stays_in_the_log() {
    let metrics = Metrics::new("test").unwrap();

    metrics.set("foo", 100);
    metrics.set("foo", 101);

    assert_eq!(metrics.get("foo"), Some(Value::Int(101)));
    assert_eq!(metrics.filter(&EventFilter::new().key("foo")).len(), 2);
}

#[test]
fn mixed_value_kinds_coexist_under_nested_keys() {
    let metrics = Metrics::new("test").unwrap();

    metrics.inc("net.requests");
    metrics.set("net.status", "ready");
    metrics.set("net.ratio", 0.5);
    metrics.set("net.enabled", true);

    assert_eq!(metrics.get("net.requests"), Some(Value::Int(1)));
    assert_eq!(metrics.get("net.status"), Some(Value::from("ready")));
    assert_eq!(metrics.get("net.ratio"), Some(Value::Float(0.5)));
    assert_eq!(metrics.get("net.enabled"), Some(Value::Bool(true)));

    // The whole "net" branch is one nested mapping in the aggregate snapshot.
    let values = metrics.values();
    let net = values.get("net").and_then(Value::as_map).unwrap();
    assert_eq!(net.len(), 4);
}

#[test]
fn deep_propagation_reaches_every_ancestor_in_order() {
    let root = Metrics::new("root").unwrap();
    let middle = root.extend("middle").unwrap();
    let leaf = middle.extend("leaf").unwrap();

    leaf.inc("x");
    middle.inc("y");
    leaf.dec("x");

    // Leaf log: only its own events.
    assert_eq!(leaf.log_len(), 2);

    // Middle log: its own event plus the leaf's, in generation order.
    let middle_keys: Vec<_> = middle
        .filter(&EventFilter::new())
        .iter()
        .map(|event| event.key().to_string())
        .collect();
    assert_eq!(middle_keys, ["x", "y", "x"]);

    // Root absorbed everything.
    assert_eq!(root.log_len(), 3);
    assert_eq!(root.get("x"), Some(Value::Int(0)));
    assert_eq!(root.get("y"), Some(Value::Int(1)));

    // Source-scoped filtering separates the streams again.
    assert_eq!(root.filter(&EventFilter::new().source("leaf")).len(), 2);
    assert_eq!(root.filter(&EventFilter::new().source("middle")).len(), 1);
}

#[test]
fn reset_on_a_child_leaves_the_parent_aggregate_alone() {
    let root = Metrics::new("root").unwrap();
    let child = root.extend("c").unwrap();

    child.inc("x");
    child.inc("x");
    child.reset();

    assert_eq!(child.get("x"), None);
    assert_eq!(root.get("x"), Some(Value::Int(2)));

    child.inc("x");

    assert_eq!(child.get("x"), Some(Value::Int(1)));
    assert_eq!(root.get("x"), Some(Value::Int(3)));
}

#[test]
fn timers_interleave_with_counters_deterministically() {
    let manual = ManualClock::new(SystemTime::UNIX_EPOCH);
    let root = Metrics::with_clock("root", Clock::manual(&manual)).unwrap();
    let child = root.extend("io").unwrap();

    let timer = child.start("read");
    manual.advance(Duration::from_millis(12));
    child.inc("reads");
    manual.advance(Duration::from_millis(8));
    timer.end();

    // The period is stamped with its start instant even though a counter
    // event was recorded in between.
    let periods = root.filter(&EventFilter::new().kind(EventKind::Period));
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].timestamp(), SystemTime::UNIX_EPOCH);
    assert_eq!(periods[0].duration(), Some(Duration::from_millis(20)));

    // Log order is recording order: the counter event precedes the period.
    let keys: Vec<_> = root
        .filter(&EventFilter::new())
        .iter()
        .map(|event| event.key().to_string())
        .collect();
    assert_eq!(keys, ["reads", "read"]);
}

#[test]
fn delete_and_absent_set_behave_identically() {
    let metrics = Metrics::new("test").unwrap();

    metrics.set("a.b", 1);
    metrics.delete("a.b");
    assert_eq!(metrics.get("a.b"), None);
    assert_eq!(metrics.get("a"), None);

    metrics.set("a.b", 2);
    metrics.set_opt("a.b", None);
    assert_eq!(metrics.get("a.b"), None);
    assert_eq!(metrics.get("a"), None);
}

#[test]
fn process_wide_tree_collects_from_the_factory() {
    let metrics = scoped("scope_tree_integration").unwrap();

    metrics.inc("checks");

    assert_eq!(metrics.get("checks"), Some(Value::Int(1)));
    assert!(
        scoped_metrics::root()
            .tags()
            .contains("scope_tree_integration")
    );
}
