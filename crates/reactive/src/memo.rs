//! The `select` cache behind memoized selectors.

use alloc::rc::Rc;
use alloc::vec::Vec;
use capi_core::{Result, Value};
use core::cell::{Cell, RefCell};
use core::fmt;

/// Computes a memoized value from its argument tuple.
pub type ComputeFn = Rc<dyn Fn(&[Value]) -> Result<Value>>;

/// Remembers the last argument tuple and its result.
///
/// A call whose arguments are positionally `same` as the previous call's
/// returns the previous result by reference; anything else recomputes.
pub struct Memo {
    compute: ComputeFn,
    last: RefCell<Option<(Vec<Value>, Value)>>,
    calls: Cell<usize>,
}

impl Memo {
    /// Wraps a compute function.
    pub fn new<F>(compute: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Self {
            compute: Rc::new(compute),
            last: RefCell::new(None),
            calls: Cell::new(0),
        }
    }

    /// Returns the cached result for `args`, computing it on a miss.
    pub fn select(&self, args: &[Value]) -> Result<Value> {
        if let Some((last_args, result)) = &*self.last.borrow() {
            if same_args(last_args, args) {
                return Ok(result.clone());
            }
        }
        let result = (self.compute)(args)?;
        self.calls.set(self.calls.get() + 1);
        *self.last.borrow_mut() = Some((args.to_vec(), result.clone()));
        Ok(result)
    }

    /// How many times the compute function ran.
    #[inline]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl fmt::Debug for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo").field("calls", &self.calls.get()).finish()
    }
}

fn same_args(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
}
