//! State change events.
//!
//! A `StateChange` is emitted once per dispatch that replaced the root tree.
//! Subscribers diff their own recorded values against `current`.

use alloc::string::String;
use capi_core::Value;

/// The root tree was replaced by a dispatch.
#[derive(Clone, Debug)]
pub struct StateChange {
    /// Name of the action that produced the change
    pub action: String,
    /// Root tree before the dispatch
    pub previous: Value,
    /// Root tree after the dispatch
    pub current: Value,
}

impl StateChange {
    /// Creates a change event.
    pub fn new(action: impl Into<String>, previous: Value, current: Value) -> Self {
        Self {
            action: action.into(),
            previous,
            current,
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_change_keeps_both_roots() {
        let previous = Value::from(json!({"a": [1], "b": [2]}));
        let mut obj = previous.as_object().unwrap().clone();
        obj.insert("a", Value::from(json!([3])));
        let current = Value::from(obj);

        let change = StateChange::new("setA", previous.clone(), current);
        assert_eq!(change.action, "setA");
        assert!(change.previous.same(&previous));
        assert!(!change.current.same(&previous));
        assert!(change.current.get("b").unwrap().same(previous.get("b").unwrap()));
    }
}
