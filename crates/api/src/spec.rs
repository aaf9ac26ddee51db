//! The schema registry authoring form.
//!
//! A [`Spec`] declares selectors, redactions, thunks and static values by
//! name. Specs nest: an included spec without an [`api`](Spec::api) name
//! merges into its parent's context, one with a name becomes a distinct
//! sub-context. A [`mount`](Spec::mount) locates the spec's slice of the
//! state tree relative to its parent.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::{Result, Value};
use capi_patch::Schema;
use capi_path::PathDescription;
use capi_reactive::{Memo, Selector};
use core::future::Future;
use futures::future::{FutureExt, LocalBoxFuture};

use crate::context::Context;

/// `(context, state, args) -> result`
pub type ThunkFn = Rc<dyn Fn(&Context, &Value, &[Value]) -> Result<Value>>;

/// `(context, state, args) -> future`
pub type DeferredFn = Rc<dyn Fn(&Context, &Value, &[Value]) -> LocalBoxFuture<'static, Result<Value>>>;

/// `(args) -> schema`
pub type RedactionFn = Rc<dyn Fn(&[Value]) -> Result<Schema<Context>>>;

/// A composed mutation.
#[derive(Clone)]
pub enum Thunk {
    /// Runs to completion inside `call`
    Sync(ThunkFn),
    /// Suspends between steps; only `call_async` runs it
    Deferred(DeferredFn),
}

/// One named entry of a spec.
#[derive(Clone)]
pub(crate) enum Declaration {
    Selector(Selector<Context>),
    Redaction(RedactionFn),
    Thunk(Thunk),
    Value(Value),
}

impl Declaration {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Declaration::Selector(_) => "selector",
            Declaration::Redaction(_) => "redaction",
            Declaration::Thunk(_) => "thunk",
            Declaration::Value(_) => "value",
        }
    }
}

/// Declarations for one level of an api, plus nested specs.
///
/// Cloning a spec shares its memoized selector caches.
#[derive(Clone, Default)]
pub struct Spec {
    pub(crate) declarations: Vec<(String, Declaration)>,
    pub(crate) specs: Vec<Spec>,
    pub(crate) api: Option<String>,
    pub(crate) mount: Option<PathDescription<Context>>,
}

impl Spec {
    /// Creates an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// A spec made of an ordered sequence of specs.
    pub fn sequence<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = Spec>,
    {
        Self {
            specs: specs.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Declares a selector: `(state, context) -> value`.
    pub fn selector<F>(mut self, name: impl Into<String>, select: F) -> Self
    where
        F: Fn(&Value, &Context) -> Result<Value> + 'static,
    {
        self.declarations
            .push((name.into(), Declaration::Selector(Selector::simple(select))));
        self
    }

    /// Declares a memoized selector.
    ///
    /// `invoke` gathers the inputs and hands them to `memo.select`;
    /// `compute` runs only when that tuple changes.
    pub fn memo_selector<I, F>(mut self, name: impl Into<String>, invoke: I, compute: F) -> Self
    where
        I: Fn(&Memo, &Context) -> Result<Value> + 'static,
        F: Fn(&[Value]) -> Result<Value> + 'static,
    {
        self.declarations
            .push((name.into(), Declaration::Selector(Selector::memo(invoke, compute))));
        self
    }

    /// Declares a synchronous thunk.
    pub fn thunk<F>(mut self, name: impl Into<String>, thunk: F) -> Self
    where
        F: Fn(&Context, &Value, &[Value]) -> Result<Value> + 'static,
    {
        self.declarations
            .push((name.into(), Declaration::Thunk(Thunk::Sync(Rc::new(thunk)))));
        self
    }

    /// Declares an asynchronous thunk.
    ///
    /// The returned future must own what it uses; clone the context into it.
    pub fn deferred_thunk<F, Fut>(mut self, name: impl Into<String>, thunk: F) -> Self
    where
        F: Fn(&Context, &Value, &[Value]) -> Fut + 'static,
        Fut: Future<Output = Result<Value>> + 'static,
    {
        let deferred: DeferredFn = Rc::new(move |ctx, state, args| thunk(ctx, state, args).boxed_local());
        self.declarations
            .push((name.into(), Declaration::Thunk(Thunk::Deferred(deferred))));
        self
    }

    /// Declares a redaction: `(args) -> schema`.
    pub fn redaction<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Schema<Context>> + 'static,
    {
        self.declarations
            .push((name.into(), Declaration::Redaction(Rc::new(factory))));
        self
    }

    /// Declares a static context value.
    pub fn value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.declarations
            .push((name.into(), Declaration::Value(value.into())));
        self
    }

    /// Appends a nested spec.
    pub fn include(mut self, spec: Spec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Exposes this spec as the sub-context `name`.
    pub fn api(mut self, name: impl Into<String>) -> Self {
        self.api = Some(name.into());
        self
    }

    /// Locates this spec's slice relative to its parent.
    pub fn mount(mut self, mount: PathDescription<Context>) -> Self {
        self.mount = Some(mount);
        self
    }
}
