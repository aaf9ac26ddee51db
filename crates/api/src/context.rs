//! Per-consumer contexts.
//!
//! A [`Context`] is what one consumer (a component instance, a test, a
//! thunk) sees of the api: selectors and static values to read, redactions
//! and thunks to call, and the sub-contexts of named child specs.
//!
//! Reading a selector records the value under its name for the current read
//! cycle and subscribes the context to state changes. Reads a selector makes
//! of its siblings while computing are not recorded. When a change arrives
//! the recorded selectors are recomputed in read order; the first one whose
//! value is no longer `same` releases the subscriptions of the whole
//! context family (a root and its sub-contexts share one render callback)
//! and triggers the render callback once. The next tracked read subscribes
//! again.

use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::{Error, Object, Result, Value};
use capi_patch::{apply, SchemaNode};
use capi_path::PathMap;
use capi_reactive::{ReadCycle, Resolve, Selector, StateChange, SubscriptionId};
use core::cell::{Cell, RefCell};
use core::fmt;
use futures::future::{self, FutureExt, LocalBoxFuture};
use tracing::{debug, trace};

use crate::api::ApiInner;
use crate::mock::Mock;
use crate::registry::{Binding, Node};
use crate::spec::{Declaration, RedactionFn, Thunk};

/// Called when a value the consumer read has gone stale.
pub type RenderFn = Rc<dyn Fn()>;

/// Clonable handle to one consumer's view of the api.
///
/// The subscription is released by [`release`](Context::release) or when
/// the last handle is dropped.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

pub(crate) struct ContextInner {
    id: u64,
    node: Rc<Node>,
    api: Rc<ApiInner>,
    props: RefCell<Value>,
    cycle: RefCell<ReadCycle>,
    tracking: Cell<bool>,
    subscription: Cell<Option<SubscriptionId>>,
    render: RenderFn,
    /// Top of the sub-context family; `None` for a root.
    root: Option<Weak<ContextInner>>,
    children: RefCell<hashbrown::HashMap<String, Context>>,
}

impl Drop for ContextInner {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            if let Ok(store) = self.api.store() {
                store.unsubscribe(id);
            }
        }
    }
}

impl Context {
    pub(crate) fn new(
        api: &Rc<ApiInner>,
        node: Rc<Node>,
        props: Value,
        render: RenderFn,
        root: Option<Weak<ContextInner>>,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                id: api.registry.next_id(),
                node,
                api: api.clone(),
                props: RefCell::new(merge_props(&empty_props(), props)),
                cycle: RefCell::new(ReadCycle::new()),
                tracking: Cell::new(true),
                subscription: Cell::new(None),
                render,
                root,
                children: RefCell::new(hashbrown::HashMap::new()),
            }),
        }
    }

    /// Instance id, unique within one api.
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Starts a read cycle with `props` merged over the current props.
    ///
    /// Selectors read in the previous cycle are forgotten. Sub-contexts
    /// already created start a cycle too, with their slice of the props.
    pub fn begin(&self, props: Value) {
        {
            let mut current = self.inner.props.borrow_mut();
            *current = merge_props(&current, props);
        }
        self.inner.cycle.borrow_mut().begin();

        let children: Vec<(String, Context)> = self
            .inner
            .children
            .borrow()
            .iter()
            .map(|(name, child)| (name.clone(), child.clone()))
            .collect();
        for (name, child) in children {
            child.begin(self.prop(&name).unwrap_or_else(empty_props));
        }
    }

    /// Reads a name: mocked value, prop, selector or static value, in that order.
    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.mock().and_then(|mock| mock.value(name)) {
            return Ok(value);
        }
        if let Some(value) = self.prop(name) {
            return Ok(value);
        }
        let binding = self
            .inner
            .node
            .binding(name)
            .ok_or_else(|| Error::unknown_name(name))?;
        match &binding.declaration {
            Declaration::Selector(selector) => {
                // Reads made while computing a selector are its inputs, not the consumer's.
                let tracking = self.inner.tracking.replace(false);
                let value = self.select(selector, binding);
                self.inner.tracking.set(tracking);
                let value = value?;
                if tracking {
                    self.inner.cycle.borrow_mut().record(name, value.clone());
                    self.subscribe();
                }
                Ok(value)
            }
            Declaration::Value(value) => Ok(value.clone()),
            other => Err(Error::custom(format!(
                "{} '{}' cannot be read",
                other.kind(),
                name
            ))),
        }
    }

    /// Calls a redaction or synchronous thunk.
    ///
    /// Redactions return `Null` once dispatched. While a mock is installed
    /// the call is recorded and nothing runs.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let binding = self.callable(name)?;
        if let Some(mock) = self.mock() {
            mock.record(name, args);
            return Ok(Value::Null);
        }
        match &binding.declaration {
            Declaration::Redaction(factory) => {
                self.redact(name, factory, binding, args)?;
                Ok(Value::Null)
            }
            Declaration::Thunk(Thunk::Sync(thunk)) => {
                let state = self.slice(&binding.mount)?;
                thunk(self, &state, args)
            }
            Declaration::Thunk(Thunk::Deferred(_)) => Err(Error::AsyncThunk {
                name: String::from(name),
            }),
            other => Err(not_callable(other, name)),
        }
    }

    /// Calls a redaction or thunk of either kind.
    pub fn call_async(&self, name: &str, args: &[Value]) -> LocalBoxFuture<'static, Result<Value>> {
        let deferred = match self.inner.node.binding(name) {
            Some(Binding {
                declaration: Declaration::Thunk(Thunk::Deferred(thunk)),
                mount,
            }) if self.mock().is_none() => Some((thunk.clone(), mount)),
            _ => None,
        };
        match deferred {
            Some((thunk, mount)) => match self.slice(mount) {
                Ok(state) => thunk(self, &state, args),
                Err(err) => future::ready(Err(err)).boxed_local(),
            },
            None => future::ready(self.call(name, args)).boxed_local(),
        }
    }

    /// The context of the child spec exposed as `name`.
    ///
    /// Its props are this context's `props[name]`.
    pub fn sub(&self, name: &str) -> Result<Context> {
        if let Some(child) = self.inner.children.borrow().get(name) {
            return Ok(child.clone());
        }
        let node = self
            .inner
            .node
            .child(name)
            .ok_or_else(|| Error::unknown_name(name))?
            .clone();
        let root = self
            .inner
            .root
            .clone()
            .unwrap_or_else(|| Rc::downgrade(&self.inner));
        let child = Context::new(
            &self.inner.api,
            node,
            empty_props(),
            self.inner.render.clone(),
            Some(root),
        );
        child.begin(self.prop(name).unwrap_or_else(empty_props));
        self.inner
            .children
            .borrow_mut()
            .insert(String::from(name), child.clone());
        Ok(child)
    }

    /// A prop passed to [`begin`](Context::begin).
    pub fn prop(&self, name: &str) -> Option<Value> {
        self.inner.props.borrow().get(name).cloned()
    }

    /// All current props.
    pub fn props(&self) -> Value {
        self.inner.props.borrow().clone()
    }

    /// Selector names and values read in the current cycle, in read order.
    pub fn selectors_used(&self) -> Vec<(String, Value)> {
        self.inner.cycle.borrow().used().to_vec()
    }

    /// Cycles started after the first.
    pub fn render_count(&self) -> usize {
        self.inner.cycle.borrow().render_count()
    }

    /// Returns true while the context listens for state changes.
    pub fn is_subscribed(&self) -> bool {
        self.inner.subscription.get().is_some()
    }

    /// Stops listening for state changes, here and in sub-contexts.
    pub fn release(&self) {
        if let Some(id) = self.inner.subscription.take() {
            if let Ok(store) = self.inner.api.store() {
                store.unsubscribe(id);
            }
        }
        for child in self.inner.children.borrow().values() {
            child.release();
        }
    }

    fn root(&self) -> Context {
        match self.inner.root.as_ref().and_then(Weak::upgrade) {
            Some(inner) => Context { inner },
            None => self.clone(),
        }
    }

    fn mock(&self) -> Option<Mock> {
        self.inner.api.mock()
    }

    fn callable(&self, name: &str) -> Result<&Binding> {
        let binding = self
            .inner
            .node
            .binding(name)
            .ok_or_else(|| Error::unknown_name(name))?;
        match &binding.declaration {
            Declaration::Redaction(_) | Declaration::Thunk(_) => Ok(binding),
            other => Err(not_callable(other, name)),
        }
    }

    /// The state slice a binding is mounted on; `Null` when the path misses.
    fn slice(&self, mount: &PathMap<Context>) -> Result<Value> {
        let store = self.inner.api.store()?;
        let path = PathMap::compose(&self.inner.api.mount(), mount);
        Ok(path.resolve(&store.state(), self).unwrap_or(Value::Null))
    }

    fn select(&self, selector: &Selector<Context>, binding: &Binding) -> Result<Value> {
        let state = self.slice(&binding.mount)?;
        selector.resolve(&state, self)
    }

    /// Reads without recording or subscribing.
    fn peek(&self, name: &str) -> Result<Value> {
        let tracking = self.inner.tracking.replace(false);
        let value = self.get(name);
        self.inner.tracking.set(tracking);
        value
    }

    fn redact(&self, name: &str, factory: &RedactionFn, binding: &Binding, args: &[Value]) -> Result<bool> {
        let store = self.inner.api.store()?;
        let schema = factory(args)?;
        if schema.is_command() {
            return Err(Error::invalid_schema(format!(
                "redaction '{}' did not return a schema",
                name
            )));
        }
        let path = PathMap::compose(&self.inner.api.mount(), &binding.mount);
        let node = SchemaNode::embed(&path, schema.compile());
        trace!(context = self.inner.id, redaction = name, "redact");
        store.dispatch(name, |state| apply(state, &node, self))
    }

    fn subscribe(&self) {
        if self.inner.subscription.get().is_some() {
            return;
        }
        let store = match self.inner.api.store() {
            Ok(store) => store,
            Err(_) => return,
        };
        let weak = Rc::downgrade(&self.inner);
        let id = store.subscribe(move |change| {
            if let Some(inner) = weak.upgrade() {
                Context { inner }.on_change(change);
            }
        });
        self.inner.subscription.set(Some(id));
    }

    fn on_change(&self, change: &StateChange) {
        let cycle = self.inner.cycle.borrow().clone();
        let stale = cycle.first_stale(|name| self.peek(name)).map(String::from);
        if let Some(selector) = stale {
            // The family's other subscriptions must skip this dispatch.
            self.root().release();
            debug!(
                api = self.inner.api.config.label.as_str(),
                context = self.inner.id,
                selector = selector.as_str(),
                action = change.action.as_str(),
                "render"
            );
            (self.inner.render)();
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.inner.id)
            .field("level", &self.inner.node.path)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

fn empty_props() -> Value {
    Value::from(Object::new())
}

fn merge_props(current: &Value, props: Value) -> Value {
    match (current.as_object(), props.as_object()) {
        (Some(a), Some(b)) => Value::from(a.merged(b)),
        (None, Some(_)) => props,
        _ => current.clone(),
    }
}

fn not_callable(declaration: &Declaration, name: &str) -> Error {
    Error::custom(format!("{} '{}' cannot be called", declaration.kind(), name))
}
