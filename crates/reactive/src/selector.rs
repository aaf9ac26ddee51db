//! Selector resolvers.
//!
//! A selector is resolved explicitly through [`Resolve`], never through
//! implicit property access. The side context `C` is whatever the caller
//! hands to selectors (the facade passes its per-consumer context).

use alloc::rc::Rc;
use capi_core::{Result, Value};

use crate::memo::Memo;

/// Computes a selector's value.
pub trait Resolve<C> {
    /// Resolves against the mapped state slice and the side context.
    fn resolve(&self, state: &Value, ctx: &C) -> Result<Value>;
}

/// `(state, ctx) -> value`
pub type SelectFn<C> = Rc<dyn Fn(&Value, &C) -> Result<Value>>;

/// `(memo, ctx) -> value`; calls `memo.select(args)` with its inputs.
pub type InvokeFn<C> = Rc<dyn Fn(&Memo, &C) -> Result<Value>>;

/// A plain function of the state slice.
pub struct SimpleSelector<C> {
    select: SelectFn<C>,
}

impl<C> SimpleSelector<C> {
    /// Wraps a selector function.
    pub fn new<F>(select: F) -> Self
    where
        F: Fn(&Value, &C) -> Result<Value> + 'static,
    {
        Self {
            select: Rc::new(select),
        }
    }
}

impl<C> Clone for SimpleSelector<C> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
        }
    }
}

impl<C> Resolve<C> for SimpleSelector<C> {
    fn resolve(&self, state: &Value, ctx: &C) -> Result<Value> {
        (self.select)(state, ctx)
    }
}

/// An invoker paired with a memoized compute function.
///
/// Clones share the cache, so every consumer of one selector definition
/// sees the same output identity for the same inputs.
pub struct MemoSelector<C> {
    invoke: InvokeFn<C>,
    memo: Rc<Memo>,
}

impl<C> MemoSelector<C> {
    /// Pairs an invoker with the function it memoizes.
    pub fn new<I, F>(invoke: I, compute: F) -> Self
    where
        I: Fn(&Memo, &C) -> Result<Value> + 'static,
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Self {
            invoke: Rc::new(invoke),
            memo: Rc::new(Memo::new(compute)),
        }
    }

    /// The cache, for diagnostics.
    pub fn memo(&self) -> &Memo {
        &self.memo
    }
}

impl<C> Clone for MemoSelector<C> {
    fn clone(&self) -> Self {
        Self {
            invoke: self.invoke.clone(),
            memo: self.memo.clone(),
        }
    }
}

impl<C> Resolve<C> for MemoSelector<C> {
    fn resolve(&self, _state: &Value, ctx: &C) -> Result<Value> {
        (self.invoke)(&self.memo, ctx)
    }
}

/// Either kind of selector.
pub enum Selector<C> {
    Simple(SimpleSelector<C>),
    Memo(MemoSelector<C>),
}

impl<C> Selector<C> {
    /// Builds a plain selector.
    pub fn simple<F>(select: F) -> Self
    where
        F: Fn(&Value, &C) -> Result<Value> + 'static,
    {
        Selector::Simple(SimpleSelector::new(select))
    }

    /// Builds a memoized selector.
    pub fn memo<I, F>(invoke: I, compute: F) -> Self
    where
        I: Fn(&Memo, &C) -> Result<Value> + 'static,
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        Selector::Memo(MemoSelector::new(invoke, compute))
    }
}

impl<C> Clone for Selector<C> {
    fn clone(&self) -> Self {
        match self {
            Selector::Simple(s) => Selector::Simple(s.clone()),
            Selector::Memo(m) => Selector::Memo(m.clone()),
        }
    }
}

impl<C> Resolve<C> for Selector<C> {
    fn resolve(&self, state: &Value, ctx: &C) -> Result<Value> {
        match self {
            Selector::Simple(s) => s.resolve(state, ctx),
            Selector::Memo(m) => m.resolve(state, ctx),
        }
    }
}
