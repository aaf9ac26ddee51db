//! The single shared state tree.

use alloc::rc::Rc;
use capi_core::{Result, Value};
use core::cell::RefCell;
use tracing::debug;

use crate::event::StateChange;
use crate::subscription::{SubscriptionId, SubscriptionManager};

/// Cheap clonable handle to the root tree and its subscribers.
///
/// Every handle clone refers to the same tree. Dispatch replaces the tree
/// synchronously and notifies subscribers, oldest first, before returning.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

struct StoreInner {
    state: RefCell<Value>,
    subscriptions: RefCell<SubscriptionManager>,
}

impl Store {
    /// Creates a store holding `initial`.
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(initial),
                subscriptions: RefCell::new(SubscriptionManager::new()),
            }),
        }
    }

    /// Returns the current root tree.
    pub fn state(&self) -> Value {
        self.inner.state.borrow().clone()
    }

    /// Runs `patch` against the current tree and installs its result.
    ///
    /// Returns whether the root was replaced. A patch that hands back the
    /// same root reference (or fails) replaces nothing and notifies nobody.
    pub fn dispatch<F>(&self, action: &str, patch: F) -> Result<bool>
    where
        F: FnOnce(&Value) -> Result<Value>,
    {
        let previous = self.state();
        let current = patch(&previous)?;
        if current.same(&previous) {
            debug!(action, replaced = false, "dispatch");
            return Ok(false);
        }
        *self.inner.state.borrow_mut() = current.clone();
        debug!(action, replaced = true, "dispatch");

        let change = StateChange::new(action, previous, current);
        let snapshot = self.inner.subscriptions.borrow().snapshot();
        for (id, callback) in snapshot {
            // An earlier subscriber may have released this one.
            if self.is_subscribed(id) {
                callback(&change);
            }
        }
        Ok(true)
    }

    /// Registers a change callback.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + 'static,
    {
        self.inner.subscriptions.borrow_mut().subscribe(callback)
    }

    /// Removes a subscription; returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscriptions.borrow_mut().unsubscribe(id)
    }

    /// Returns true if the subscription is still registered.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner.subscriptions.borrow().contains(id)
    }

    /// Number of registered subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriptions.borrow().len()
    }

    /// Returns true if both handles refer to the same store.
    pub fn ptr_eq(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use capi_core::Error;
    use core::cell::Cell;
    use serde_json::json;

    fn increment(state: &Value) -> Result<Value> {
        let count = state.get("count").and_then(Value::as_i64).unwrap_or(0);
        Ok(Value::object([("count", Value::from(count + 1))]))
    }

    #[test]
    fn test_dispatch_replaces_and_notifies() {
        let store = Store::new(Value::from(json!({"count": 0})));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        store.subscribe(move |change| {
            seen_clone
                .borrow_mut()
                .push((change.action.clone(), change.current.get("count").cloned()));
        });

        assert!(store.dispatch("increment", increment).unwrap());
        assert_eq!(store.state().get("count"), Some(&Value::from(1)));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "increment");
        assert_eq!(seen[0].1, Some(Value::from(1)));
    }

    #[test]
    fn test_same_root_is_not_a_change() {
        let store = Store::new(Value::from(json!({"count": 0})));
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        store.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));

        assert!(!store.dispatch("noop", |state| Ok(state.clone())).unwrap());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_failed_patch_keeps_state() {
        let store = Store::new(Value::from(json!({"count": 0})));
        let before = store.state();
        let err = store
            .dispatch("broken", |_| Err(Error::custom("boom")))
            .unwrap_err();
        assert_eq!(err, Error::custom("boom"));
        assert!(store.state().same(&before));
    }

    #[test]
    fn test_subscriber_may_unsubscribe_another() {
        let store = Store::new(Value::from(0));
        let second_calls = Rc::new(Cell::new(0));

        let victim = Rc::new(Cell::new(0u64));
        let victim_clone = victim.clone();
        let handle = store.clone();
        store.subscribe(move |_| {
            handle.unsubscribe(victim_clone.get());
        });
        let second_clone = second_calls.clone();
        victim.set(store.subscribe(move |_| second_clone.set(second_clone.get() + 1)));

        store.dispatch("bump", |_| Ok(Value::from(1))).unwrap();
        assert_eq!(second_calls.get(), 0);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_subscriber_reads_new_state() {
        let store = Store::new(Value::from(0));
        let observed = Rc::new(RefCell::new(Value::Null));
        let observed_clone = observed.clone();
        let handle = store.clone();
        store.subscribe(move |_| *observed_clone.borrow_mut() = handle.state());

        store.dispatch("set", |_| Ok(Value::from(5))).unwrap();
        assert_eq!(*observed.borrow(), Value::from(5));
        assert!(store.ptr_eq(&store.clone()));
        assert!(!store.ptr_eq(&Store::new(Value::from(5))));
    }
}
