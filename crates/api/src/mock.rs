//! Call recorders installed by [`Api::mock`](crate::Api::mock).

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::Value;
use core::cell::RefCell;

/// Test double for dispatch.
///
/// While installed, redactions and thunks are recorded instead of run and
/// the mocked names read as their table values. Handles share one record.
#[derive(Clone, Default)]
pub struct Mock {
    inner: Rc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    values: hashbrown::HashMap<String, Value>,
    calls: RefCell<hashbrown::HashMap<String, Vec<Vec<Value>>>>,
}

impl Mock {
    pub(crate) fn new<K, I>(values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            inner: Rc::new(MockInner {
                values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
                calls: RefCell::new(hashbrown::HashMap::new()),
            }),
        }
    }

    /// The mocked value for `name`.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.inner.values.get(name).cloned()
    }

    pub(crate) fn record(&self, name: &str, args: &[Value]) {
        self.inner
            .calls
            .borrow_mut()
            .entry(String::from(name))
            .or_default()
            .push(args.to_vec());
    }

    /// Argument lists of every recorded call to `name`, oldest first.
    pub fn calls(&self, name: &str) -> Vec<Vec<Value>> {
        self.inner
            .calls
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of recorded calls to `name`.
    pub fn call_count(&self, name: &str) -> usize {
        self.inner.calls.borrow().get(name).map_or(0, Vec::len)
    }
}
