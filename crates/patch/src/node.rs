//! Compiled schema nodes.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::Value;
use capi_path::{PathMap, PathStep, Predicate};
use core::fmt;

/// `(root, current, ctx) -> value`, used by `set` and `assign`.
pub type UpdateFn<C> = Rc<dyn Fn(&Value, &Value, &C) -> Value>;

/// `(root, ctx) -> element`, used by `append` and `insert`.
pub type MakeFn<C> = Rc<dyn Fn(&Value, &C) -> Value>;

/// `(root, ctx) -> index`, used by `before` and `after`.
pub type PositionFn<C> = Rc<dyn Fn(&Value, &C) -> i64>;

/// A compiled redaction schema.
pub enum SchemaNode<C> {
    /// Replace the current value
    Set(UpdateFn<C>),
    /// Push one element onto the current array
    Append(MakeFn<C>),
    /// Insert at `max(before, 0)`
    InsertBefore(MakeFn<C>, PositionFn<C>),
    /// Insert at `after + 1`
    InsertAfter(MakeFn<C>, PositionFn<C>),
    /// Shallow-merge a partial object into the current object
    Assign(UpdateFn<C>),
    /// Remove the current array element
    Delete,
    /// Apply the node to every element of the current array the predicate accepts
    Match(Predicate<C>, Box<SchemaNode<C>>),
    /// Apply nodes to the named children that exist
    Group(Vec<(String, SchemaNode<C>)>),
    /// Continue with the current value as the root callbacks see
    Reroot(Box<SchemaNode<C>>),
    /// Several nodes at the same position
    Batch(Vec<SchemaNode<C>>),
}

impl<C> Clone for SchemaNode<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Set(f) => Self::Set(f.clone()),
            Self::Append(f) => Self::Append(f.clone()),
            Self::InsertBefore(f, p) => Self::InsertBefore(f.clone(), p.clone()),
            Self::InsertAfter(f, p) => Self::InsertAfter(f.clone(), p.clone()),
            Self::Assign(f) => Self::Assign(f.clone()),
            Self::Delete => Self::Delete,
            Self::Match(p, node) => Self::Match(p.clone(), node.clone()),
            Self::Group(fields) => Self::Group(fields.clone()),
            Self::Reroot(node) => Self::Reroot(node.clone()),
            Self::Batch(nodes) => Self::Batch(nodes.clone()),
        }
    }
}

impl<C> fmt::Debug for SchemaNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(_) => f.write_str("Set"),
            Self::Append(_) => f.write_str("Append"),
            Self::InsertBefore(..) => f.write_str("InsertBefore"),
            Self::InsertAfter(..) => f.write_str("InsertAfter"),
            Self::Assign(_) => f.write_str("Assign"),
            Self::Delete => f.write_str("Delete"),
            Self::Match(_, node) => f.debug_tuple("Match").field(node).finish(),
            Self::Group(fields) => {
                let mut map = f.debug_map();
                for (k, v) in fields {
                    map.entry(k, v);
                }
                map.finish()
            }
            Self::Reroot(node) => f.debug_tuple("Reroot").field(node).finish(),
            Self::Batch(nodes) => f.debug_list().entries(nodes.iter()).finish(),
        }
    }
}

impl<C> SchemaNode<C> {
    /// Wraps several nodes, collapsing a single one.
    pub fn batch(mut nodes: Vec<SchemaNode<C>>) -> Self {
        if nodes.len() == 1 {
            if let Some(node) = nodes.pop() {
                return node;
            }
        }
        Self::Batch(nodes)
    }

    /// Re-embeds `node` at `path` inside a larger tree.
    ///
    /// Keys become groups, predicates become matches and markers re-root.
    /// The node itself is re-rooted so its callbacks see the slice at `path`
    /// as their root state. An empty path returns `node` unchanged.
    pub fn embed(path: &PathMap<C>, node: SchemaNode<C>) -> Self {
        if path.is_empty() {
            return node;
        }
        path.steps()
            .iter()
            .rev()
            .fold(Self::Reroot(Box::new(node)), |inner, step| match step {
                PathStep::Key(key) => Self::Group(alloc::vec![(key.clone(), inner)]),
                PathStep::Where(predicate) => Self::Match(predicate.clone(), Box::new(inner)),
                PathStep::Reroot => Self::Reroot(Box::new(inner)),
            })
    }
}
