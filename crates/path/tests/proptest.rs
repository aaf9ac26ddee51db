//! Property-based tests for capi-path using proptest.

use std::rc::Rc;

use capi_core::{Key, Value};
use capi_path::{to_path_description, to_path_sequence, PathDescription, PathMap, Predicate};
use proptest::prelude::*;

/// One level of a generated description.
#[derive(Clone, Debug)]
enum Level {
    Key(String),
    Where,
    Pair,
}

fn level() -> impl Strategy<Value = Level> {
    prop_oneof![
        3 => "[a-z]{1,6}".prop_map(Level::Key),
        1 => Just(Level::Where),
        1 => Just(Level::Pair),
    ]
}

fn build(levels: &[Level], predicate: &Predicate<()>, terminal: Option<i32>) -> PathDescription<(), i32> {
    levels
        .iter()
        .rev()
        .fold(PathDescription::End(terminal), |next, level| match level {
            Level::Key(k) => PathDescription::field(k.clone(), next),
            Level::Where => PathDescription::Where(predicate.clone(), Box::new(next)),
            Level::Pair => PathDescription::Pair(predicate.clone(), Box::new(next)),
        })
}

fn by_index(_: &Value, _: &Value, key: Key<'_>, _: &()) -> bool {
    key == Key::Index(0)
}

proptest! {
    /// Flattening then rebuilding reproduces the description with the terminal in place.
    #[test]
    fn description_round_trip(
        levels in prop::collection::vec(level(), 0..8),
        terminal in prop::option::of(0i32..100)
    ) {
        let predicate: Predicate<()> = Rc::new(by_index);
        let original = build(&levels, &predicate, None);

        let map = to_path_sequence(&original).unwrap();
        prop_assert_eq!(map.len(), levels.len());

        let rebuilt = to_path_description(&map, terminal);
        let expected = build(&levels, &predicate, terminal);
        prop_assert!(rebuilt.equivalent(&expected), "{} vs {}", rebuilt, expected);
    }

    /// Composition keeps both halves and adds exactly one marker.
    #[test]
    fn compose_lengths(outer in 0usize..5, inner in 0usize..5) {
        let make = |n: usize| (0..n).fold(PathMap::<()>::new(), |m, i| m.key(i.to_string()));
        let composed = PathMap::compose(&make(outer), &make(inner));
        let marker = usize::from(outer > 0 && inner > 0);
        prop_assert_eq!(composed.len(), outer + inner + marker);
    }

    /// Key paths resolve to exactly the nested value they name.
    #[test]
    fn resolve_nested_keys(keys in prop::collection::vec("[a-z]{1,4}", 1..6), leaf in any::<i32>()) {
        let state = keys
            .iter()
            .rev()
            .fold(Value::from(leaf), |inner, k| Value::object([(k.clone(), inner)]));
        let path = keys.iter().fold(PathMap::<()>::new(), |m, k| m.key(k.clone()));
        prop_assert_eq!(path.resolve(&state, &()), Some(Value::from(leaf)));
    }
}
