//! The built api.

use alloc::rc::Rc;
use alloc::string::String;
use capi_core::{Error, Result, Value};
use capi_path::{to_path_sequence, PathDescription, PathMap};
use capi_reactive::{Store, SubscriptionId};
use core::cell::{Cell, RefCell};
use tracing::{debug, trace};

use crate::config::ApiConfig;
use crate::context::Context;
use crate::mock::Mock;
use crate::registry::Registry;
use crate::spec::Spec;
use crate::validate::{self, Validation};

/// Entry point built once from a [`Spec`].
///
/// Mount it on a [`Store`], then hand each consumer a [`Context`] through
/// [`attach`](Api::attach) or [`context`](Api::context).
pub struct Api {
    inner: Rc<ApiInner>,
}

pub(crate) struct ApiInner {
    pub(crate) registry: Registry,
    pub(crate) config: ApiConfig,
    store: RefCell<Option<Store>>,
    mount: RefCell<PathMap<Context>>,
    mock: RefCell<Option<Mock>>,
    tracer: Cell<Option<SubscriptionId>>,
}

impl ApiInner {
    pub(crate) fn store(&self) -> Result<Store> {
        self.store.borrow().clone().ok_or(Error::NotMounted)
    }

    /// Where the api's root lives inside the store's tree.
    pub(crate) fn mount(&self) -> PathMap<Context> {
        self.mount.borrow().clone()
    }

    pub(crate) fn mock(&self) -> Option<Mock> {
        self.mock.borrow().clone()
    }
}

impl Api {
    /// Builds an api with the default configuration.
    pub fn new(spec: Spec) -> Result<Self> {
        Self::with_config(spec, ApiConfig::default())
    }

    /// Builds an api. Fails when a mount description is ambiguous.
    pub fn with_config(spec: Spec, config: ApiConfig) -> Result<Self> {
        let registry = Registry::build(&spec)?;
        Ok(Self {
            inner: Rc::new(ApiInner {
                registry,
                config,
                store: RefCell::new(None),
                mount: RefCell::new(PathMap::new()),
                mock: RefCell::new(None),
                tracer: Cell::new(None),
            }),
        })
    }

    /// Attaches the api to `store`, optionally at a sub-tree of it.
    ///
    /// Mounting again replaces the previous store; existing subscriptions
    /// stay on the store they were made on.
    pub fn mount(&self, store: Store, mount: Option<PathDescription<Context>>) -> Result<&Self> {
        let map = match &mount {
            Some(description) => to_path_sequence(description)?,
            None => PathMap::new(),
        };
        if let Some(id) = self.inner.tracer.take() {
            if let Ok(previous) = self.inner.store() {
                previous.unsubscribe(id);
            }
        }
        if self.inner.config.trace_state {
            let label = self.inner.config.label.clone();
            let id = store.subscribe(move |change| {
                trace!(
                    api = label.as_str(),
                    action = change.action.as_str(),
                    state = %change.current.to_json(),
                    "state"
                );
            });
            self.inner.tracer.set(Some(id));
        }
        debug!(api = self.inner.config.label.as_str(), steps = map.len(), "mount");
        *self.inner.mount.borrow_mut() = map;
        *self.inner.store.borrow_mut() = Some(store);
        Ok(self)
    }

    /// The store the api is mounted on.
    pub fn store(&self) -> Result<Store> {
        self.inner.store()
    }

    /// The whole state tree of the mounted store.
    pub fn state(&self) -> Result<Value> {
        Ok(self.inner.store()?.state())
    }

    /// The configuration the api was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Checks every redaction against a sample state shape.
    pub fn validate(&self, shape: &Value) -> Validation {
        validate::check(&self.inner, shape)
    }

    /// Installs call recorders; names in `values` read as the given values.
    pub fn mock<K, I>(&self, values: I) -> Mock
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mock = Mock::new(values);
        *self.inner.mock.borrow_mut() = Some(mock.clone());
        mock
    }

    /// Removes the installed mock.
    pub fn unmock(&self) {
        self.inner.mock.borrow_mut().take();
    }

    /// A consumer instance whose `render` runs when a value it read goes stale.
    pub fn attach<F>(&self, render: F) -> Context
    where
        F: Fn() + 'static,
    {
        Context::new(
            &self.inner,
            self.inner.registry.root().clone(),
            Value::Null,
            Rc::new(render),
            None,
        )
    }

    /// A consumer for one-off calls; it never renders.
    pub fn context(&self, props: Value) -> Context {
        let ctx = self.attach(|| {});
        ctx.begin(props);
        ctx
    }
}
