//! Property-based tests for capi using proptest.

use std::cell::Cell;
use std::rc::Rc;

use capi::{Api, Key, Schema, Spec, Store, Value};
use proptest::prelude::*;
use serde_json::json;

fn counters_spec() -> Spec {
    Spec::new()
        .redaction("add", |args| {
            let ix = args.first().and_then(Value::as_i64).unwrap_or(0);
            let by = args.get(1).and_then(Value::as_i64).unwrap_or(0);
            Ok(Schema::new().field(
                "counters",
                Schema::pair(
                    move |_, _, key, _| key == Key::Index(ix as usize),
                    Schema::new().set(move |_, n, _| Value::from(n.as_i64().unwrap_or(0) + by)),
                ),
            ))
        })
        .selector("counters", |state, _| Ok(state.get("counters").cloned().unwrap_or_default()))
        .selector("total", |state, _| {
            let counters = state.get("counters").and_then(Value::as_array).unwrap_or(&[]);
            Ok(Value::from(counters.iter().filter_map(Value::as_i64).sum::<i64>()))
        })
}

fn mounted(len: usize) -> Api {
    let api = Api::new(counters_spec()).unwrap();
    let state = Value::from(json!({ "counters": vec![0; len] }));
    api.mount(Store::new(state), None).unwrap();
    api
}

proptest! {
    /// The total equals the sum of every applied delta.
    #[test]
    fn total_tracks_deltas(len in 1usize..6, ops in prop::collection::vec((0usize..6, -5i64..5), 0..20)) {
        let api = mounted(len);
        let ctx = api.context(Value::Null);
        let mut expected = vec![0i64; len];
        for (ix, by) in &ops {
            ctx.call("add", &[Value::from(*ix), Value::from(*by)]).unwrap();
            if let Some(n) = expected.get_mut(*ix) {
                *n += by;
            }
        }
        let counters = ctx.get("counters").unwrap();
        let actual: Vec<i64> = counters.as_array().unwrap().iter().filter_map(Value::as_i64).collect();
        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(ctx.get("total").unwrap(), Value::from(expected.iter().sum::<i64>()));
    }

    /// A consumer renders at most once per read cycle, and only after a real change.
    #[test]
    fn renders_once_per_cycle(ops in prop::collection::vec((0usize..4, 0i64..3), 1..10)) {
        let api = mounted(2);
        let renders = Rc::new(Cell::new(0usize));
        let counter = renders.clone();
        let ctx = api.attach(move || counter.set(counter.get() + 1));
        ctx.begin(Value::Null);
        ctx.get("total").unwrap();

        let caller = api.context(Value::Null);
        let mut changed = false;
        for (ix, by) in &ops {
            caller.call("add", &[Value::from(*ix), Value::from(*by)]).unwrap();
            changed |= *ix < 2 && *by != 0;
        }
        prop_assert_eq!(renders.get(), usize::from(changed));
        prop_assert_eq!(ctx.is_subscribed(), !changed);
    }
}
