//! Selector reads, memoization and render tracking.

use std::cell::Cell;
use std::rc::Rc;

use capi::{Api, Context, Error, Key, Schema, Spec, Store, Value};
use serde_json::json;

fn field(state: &Value, name: &str) -> Value {
    state.get(name).cloned().unwrap_or_default()
}

fn find_widget(widgets: &Value, id: &Value) -> Value {
    widgets
        .as_array()
        .and_then(|list| list.iter().find(|w| w.get("id") == Some(id)))
        .cloned()
        .unwrap_or_default()
}

fn by_id(_: &Value, widget: &Value, _: Key<'_>, ctx: &Context) -> bool {
    match ctx.get("id") {
        Ok(id) => widget.get("id") == Some(&id),
        Err(_) => false,
    }
}

fn widget_spec(memo_calls: Rc<Cell<usize>>) -> Spec {
    Spec::new()
        .redaction("setWidgetData", |args| {
            let data = args.first().cloned().unwrap_or_default();
            Ok(Schema::new().field(
                "widgets",
                Schema::new().filter(by_id).assign(move |_, _, _| data.clone()),
            ))
        })
        .redaction("setTestValue", |args| {
            let value = args.first().cloned().unwrap_or_default();
            Ok(Schema::new().field("testValue", Schema::new().set(move |_, _, _| value.clone())))
        })
        .selector("widgets", |state, _| Ok(field(state, "widgets")))
        .selector("widget", |state, ctx| Ok(find_widget(&field(state, "widgets"), &ctx.get("id")?)))
        .memo_selector(
            "widgetMemo",
            |memo, ctx| memo.select(&[ctx.get("widgets")?, ctx.get("id")?]),
            move |args| {
                memo_calls.set(memo_calls.get() + 1);
                Ok(find_widget(&args[0], &args[1]))
            },
        )
        .selector("testValue", |state, _| Ok(field(state, "testValue")))
        // A fresh object on every read: never `same` as the last one.
        .selector("testValueObject", |state, _| {
            Ok(Value::object([("value", field(state, "testValue"))]))
        })
        .memo_selector(
            "testValueMemo",
            |memo, ctx| memo.select(&[ctx.get("testValue")?]),
            |args| Ok(Value::object([("value", args[0].clone())])),
        )
}

fn initial() -> Value {
    Value::from(json!({
        "widgets": [{"id": 0, "text": "zero"}, {"id": 1, "text": "one"}],
        "testValue": 0
    }))
}

struct Widget {
    ctx: Context,
    renders: Rc<Cell<usize>>,
}

impl Widget {
    fn attach(api: &Api, props: serde_json::Value) -> Self {
        let renders = Rc::new(Cell::new(0));
        let seen = renders.clone();
        let ctx = api.attach(move || seen.set(seen.get() + 1));
        ctx.begin(Value::from(props));
        Self { ctx, renders }
    }

    fn text(&self, selector: &str) -> Value {
        field(&self.ctx.get(selector).unwrap(), "text")
    }
}

fn mounted(memo_calls: Rc<Cell<usize>>) -> Api {
    let api = Api::new(widget_spec(memo_calls)).unwrap();
    api.mount(Store::new(initial()), None).unwrap();
    api
}

#[test]
fn test_renders_only_the_stale_consumer() {
    let api = mounted(Rc::new(Cell::new(0)));
    let w0 = Widget::attach(&api, json!({"id": 0}));
    let w1 = Widget::attach(&api, json!({"id": 1}));
    assert_eq!(w0.text("widget"), Value::from("zero"));
    assert_eq!(w1.text("widget"), Value::from("one"));

    api.context(Value::from(json!({"id": 0})))
        .call("setWidgetData", &[Value::from(json!({"text": "zerozero"}))])
        .unwrap();
    assert_eq!((w0.renders.get(), w1.renders.get()), (1, 0));
    assert_eq!(w0.text("widget"), Value::from("zerozero"));

    api.context(Value::from(json!({"id": 1})))
        .call("setWidgetData", &[Value::from(json!({"text": "oneone"}))])
        .unwrap();
    // w0 re-read above, so it is listening again but its widget kept its identity.
    assert_eq!((w0.renders.get(), w1.renders.get()), (1, 1));
}

#[test]
fn test_memo_recomputes_once_per_input_change() {
    let calls = Rc::new(Cell::new(0));
    let api = mounted(calls.clone());
    let w0 = Widget::attach(&api, json!({"id": 0}));
    let w1 = Widget::attach(&api, json!({"id": 1}));
    assert_eq!(w0.text("widgetMemo"), Value::from("zero"));
    assert_eq!(w1.text("widgetMemo"), Value::from("one"));
    let before = calls.get();

    api.context(Value::from(json!({"id": 0})))
        .call("setWidgetData", &[Value::from(json!({"text": "zerozero"}))])
        .unwrap();
    // One recompute per consumer: the shared cache alternates between ids.
    assert_eq!(calls.get() - before, 2);
    assert_eq!((w0.renders.get(), w1.renders.get()), (1, 0));
}

#[test]
fn test_new_objects_cause_extra_renders() {
    let api = mounted(Rc::new(Cell::new(0)));
    let widget = Widget::attach(&api, json!({"id": 0}));
    let value = Widget::attach(&api, json!({}));
    widget.ctx.get("widgetMemo").unwrap();
    value.ctx.get("testValueObject").unwrap();

    api.context(Value::from(json!({"id": 0})))
        .call("setWidgetData", &[Value::from(json!({"text": "zerozero"}))])
        .unwrap();
    assert_eq!(widget.renders.get() + value.renders.get(), 2);
}

#[test]
fn test_memoized_objects_keep_identity() {
    let api = mounted(Rc::new(Cell::new(0)));
    let widget = Widget::attach(&api, json!({"id": 0}));
    let value = Widget::attach(&api, json!({}));
    widget.ctx.get("widgetMemo").unwrap();
    let first = value.ctx.get("testValueMemo").unwrap();
    assert!(first.same(&value.ctx.get("testValueMemo").unwrap()));

    api.context(Value::from(json!({"id": 0})))
        .call("setWidgetData", &[Value::from(json!({"text": "zerozero"}))])
        .unwrap();
    assert_eq!(widget.renders.get() + value.renders.get(), 1);

    api.context(Value::Null)
        .call("setTestValue", &[Value::from(5)])
        .unwrap();
    assert_eq!(value.renders.get(), 1);
    assert_eq!(value.ctx.get("testValueMemo").unwrap(), Value::from(json!({"value": 5})));
}

#[test]
fn test_stale_check_stops_at_first_mismatch() {
    let b_reads = Rc::new(Cell::new(0));
    let counted = b_reads.clone();
    let spec = Spec::new()
        .selector("a", |state, _| Ok(field(state, "a")))
        .selector("b", move |state, _| {
            counted.set(counted.get() + 1);
            Ok(field(state, "b"))
        })
        .selector("c", |state, _| Ok(field(state, "c")))
        .redaction("bump", |_| {
            Ok(Schema::new()
                .field("a", Schema::new().set(|_, _, _| Value::from(10)))
                .field("b", Schema::new().set(|_, _, _| Value::from(20))))
        });
    let api = Api::new(spec).unwrap();
    api.mount(Store::new(Value::from(json!({"a": 1, "b": 2, "c": 3}))), None)
        .unwrap();

    let renders = Rc::new(Cell::new(0));
    let seen = renders.clone();
    let ctx = api.attach(move || seen.set(seen.get() + 1));
    ctx.begin(Value::Null);
    for name in ["a", "b", "c"] {
        ctx.get(name).unwrap();
    }
    let names: Vec<_> = ctx.selectors_used().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_eq!(b_reads.get(), 1);

    api.context(Value::Null).call("bump", &[]).unwrap();
    assert_eq!(renders.get(), 1);
    // "a" was enough; "b" was never recomputed.
    assert_eq!(b_reads.get(), 1);
}

#[test]
fn test_read_cycle_forgets_unread_selectors() {
    let api = mounted(Rc::new(Cell::new(0)));
    let w = Widget::attach(&api, json!({"id": 0}));
    w.ctx.get("testValue").unwrap();
    w.ctx.get("widget").unwrap();
    assert_eq!(w.ctx.selectors_used().len(), 2);

    // Next cycle reads only the widget.
    w.ctx.begin(Value::Null);
    w.ctx.get("widget").unwrap();
    assert_eq!(w.ctx.selectors_used().len(), 1);
    assert_eq!(w.ctx.render_count(), 1);

    api.context(Value::Null)
        .call("setTestValue", &[Value::from(9)])
        .unwrap();
    assert_eq!(w.renders.get(), 0);
}

#[test]
fn test_selector_errors_propagate() {
    let spec = Spec::new().selector("strict", |state, _| {
        state
            .get("missing")
            .cloned()
            .ok_or_else(|| Error::custom("missing"))
    });
    let api = Api::new(spec).unwrap();
    api.mount(Store::new(Value::from(json!({}))), None).unwrap();
    let ctx = api.attach(|| {});
    assert_eq!(ctx.get("strict").unwrap_err(), Error::custom("missing"));
    assert!(ctx.selectors_used().is_empty());
}
