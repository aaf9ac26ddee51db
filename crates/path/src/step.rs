//! Path steps and their evaluation against a state tree.
//!
//! A `PathMap` is the flat form of a mount: an ordered list of literal keys,
//! element predicates and re-root markers.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::{Key, Value};
use core::fmt;

/// Selects an element: `(root, candidate, key, side_context) -> matched`.
pub type Predicate<C> = Rc<dyn Fn(&Value, &Value, Key<'_>, &C) -> bool>;

/// One step of a path.
pub enum PathStep<C> {
    /// Literal property name (or array index written as a string)
    Key(String),
    /// Picks the element for which the predicate holds
    Where(Predicate<C>),
    /// Re-roots predicate evaluation at the slice reached so far
    Reroot,
}

impl<C> Clone for PathStep<C> {
    fn clone(&self) -> Self {
        match self {
            PathStep::Key(k) => PathStep::Key(k.clone()),
            PathStep::Where(p) => PathStep::Where(p.clone()),
            PathStep::Reroot => PathStep::Reroot,
        }
    }
}

impl<C> fmt::Debug for PathStep<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(k) => write!(f, "{:?}", k),
            PathStep::Where(_) => f.write_str("?"),
            PathStep::Reroot => f.write_str("^"),
        }
    }
}

/// An ordered sequence of path steps.
pub struct PathMap<C> {
    steps: Vec<PathStep<C>>,
}

impl<C> Default for PathMap<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for PathMap<C> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<C> fmt::Debug for PathMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.steps.iter()).finish()
    }
}

impl<C> PathMap<C> {
    /// Creates an empty path (addresses the root itself).
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Creates a path from its steps.
    pub fn from_steps(steps: Vec<PathStep<C>>) -> Self {
        Self { steps }
    }

    /// Appends a literal key step.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(PathStep::Key(key.into()));
        self
    }

    /// Appends a predicate step.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &Value, Key<'_>, &C) -> bool + 'static,
    {
        self.steps.push(PathStep::Where(Rc::new(predicate)));
        self
    }

    /// Appends a re-root marker.
    pub fn reroot(mut self) -> Self {
        self.steps.push(PathStep::Reroot);
        self
    }

    /// Returns the steps.
    #[inline]
    pub fn steps(&self) -> &[PathStep<C>] {
        &self.steps
    }

    /// Returns the number of steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the path addresses the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Concatenates `outer`, a re-root marker, then `inner`.
    ///
    /// An empty side contributes nothing, not even the marker.
    pub fn compose(outer: &Self, inner: &Self) -> Self {
        if outer.is_empty() {
            return inner.clone();
        }
        if inner.is_empty() {
            return outer.clone();
        }
        let mut steps = Vec::with_capacity(outer.len() + inner.len() + 1);
        steps.extend(outer.steps.iter().cloned());
        steps.push(PathStep::Reroot);
        steps.extend(inner.steps.iter().cloned());
        Self { steps }
    }

    /// Walks `state` along this path and returns the addressed sub-tree.
    pub fn resolve(&self, state: &Value, ctx: &C) -> Option<Value> {
        let mut root = state.clone();
        let mut slice = state.clone();
        for step in &self.steps {
            slice = match step {
                PathStep::Reroot => {
                    root = slice.clone();
                    continue;
                }
                PathStep::Key(key) => lookup(&slice, key)?.clone(),
                PathStep::Where(predicate) => find(&root, &slice, predicate, ctx)?.clone(),
            };
        }
        Some(slice)
    }
}

/// Concatenates two path maps with a re-root marker between them.
pub fn compose_paths<C>(outer: &PathMap<C>, inner: &PathMap<C>) -> PathMap<C> {
    PathMap::compose(outer, inner)
}

/// Walks `state` following `path`; `None` when any step misses.
pub fn resolve<C>(state: &Value, path: &PathMap<C>, ctx: &C) -> Option<Value> {
    path.resolve(state, ctx)
}

fn lookup<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(obj) => obj.get(key),
        Value::Array(arr) => key.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    }
}

fn find<'a, C>(
    root: &Value,
    value: &'a Value,
    predicate: &Predicate<C>,
    ctx: &C,
) -> Option<&'a Value> {
    match value {
        Value::Array(arr) => arr
            .iter()
            .enumerate()
            .find(|(i, item)| predicate(root, item, Key::Index(*i), ctx))
            .map(|(_, item)| item),
        Value::Object(obj) => obj
            .iter()
            .find(|(k, v)| predicate(root, v, Key::Name(k), ctx))
            .map(|(_, v)| v),
        _ => None,
    }
}
