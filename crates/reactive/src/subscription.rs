//! Subscriber table of a store.

use alloc::rc::Rc;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::event::StateChange;

/// Handle returned by [`Store::subscribe`](crate::Store::subscribe).
pub type SubscriptionId = u64;

/// Callback run after the tree was replaced.
pub type ChangeCallback = Rc<dyn Fn(&StateChange)>;

/// Callbacks keyed by id. Ids grow monotonically, so id order is
/// subscription order.
pub struct SubscriptionManager {
    callbacks: HashMap<SubscriptionId, ChangeCallback>,
    next_id: SubscriptionId,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&StateChange) + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.callbacks.insert(id, Rc::new(callback));
        id
    }

    /// Returns false if `id` was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.callbacks.remove(&id).is_some()
    }

    #[inline]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.callbacks.contains_key(&id)
    }

    /// Callbacks in subscription order.
    ///
    /// Notification iterates this copy, so callbacks may subscribe or
    /// unsubscribe while it runs.
    pub fn snapshot(&self) -> Vec<(SubscriptionId, ChangeCallback)> {
        let mut callbacks: Vec<_> = self
            .callbacks
            .iter()
            .map(|(id, callback)| (*id, callback.clone()))
            .collect();
        callbacks.sort_unstable_by_key(|(id, _)| *id);
        callbacks
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}
