//! Example that instruments a small request pipeline with a scope per stage.
//!
//! Shows scope extension, counters, timers, live subscriptions and reading
//! the aggregated state back from the parent.

use scoped_metrics::{EventFilter, EventKind, Metrics, Value};

fn main() {
    let app = Metrics::new("app").expect("name is non-empty");
    let decode = app.extend("decode").expect("name is non-empty");
    let store = app.extend("store").expect("name is non-empty");

    // Watch every error counter anywhere in the tree from the root.
    let errors = app.on(
        EventFilter::new().kind(EventKind::Increment).key("errors"),
        |event| {
            println!("error recorded by '{}'", event.source());
        },
    );

    for request in 0..5 {
        let timer = decode.start("parse");
        decode.inc("requests");
        timer.end();

        if request % 2 == 0 {
            store.inc("writes");
        } else {
            store.inc("errors");
        }
    }

    errors.cancel();

    println!("decode requests: {:?}", decode.get("requests"));
    println!("store writes:    {:?}", store.get("writes"));

    // The root aggregated the whole subtree's activity.
    assert_eq!(app.get("requests"), Some(Value::Int(5)));
    let parses = app.get("parse").expect("periods were recorded");
    println!(
        "parse timings captured: {}",
        parses.as_periods().map_or(0, <[_]>::len)
    );

    println!("stage scopes under the root: {:?}", app.tags());
}
