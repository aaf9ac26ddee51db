//! The patch engine.
//!
//! Walks an old tree and a compiled schema together and returns the new tree.
//! Only containers on the path from the root to a touched node are copied;
//! everything else is shared with the old tree, so `Value::same` on any
//! untouched sub-tree holds.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use capi_core::{Error, Key, Object, Result, Value};
use capi_path::Predicate;
use tracing::trace;

use crate::node::SchemaNode;

/// Result of visiting one position.
enum Slot {
    Present(Value),
    /// The position was deleted
    Absent,
}

/// Applies `node` to `old` and returns the new tree.
///
/// Shapes the schema does not match are left untouched. A `Delete` that does
/// not land on an array element is [`Error::DeleteOutsideArray`].
pub fn apply<C>(old: &Value, node: &SchemaNode<C>, ctx: &C) -> Result<Value> {
    let patcher = Patcher { ctx };
    match patcher.visit(old, old, node)? {
        Slot::Present(value) => Ok(value),
        Slot::Absent => Err(Error::DeleteOutsideArray {
            path: String::new(),
        }),
    }
}

struct Patcher<'a, C> {
    ctx: &'a C,
}

impl<'a, C> Patcher<'a, C> {
    fn visit(&self, root: &Value, current: &Value, node: &SchemaNode<C>) -> Result<Slot> {
        let value = match node {
            SchemaNode::Set(f) => {
                trace!("set");
                f(root, current, self.ctx)
            }
            SchemaNode::Append(f) => match current {
                Value::Array(arr) => {
                    trace!(len = arr.len(), "append");
                    let mut items = Vec::with_capacity(arr.len() + 1);
                    items.extend(arr.iter().cloned());
                    items.push(f(root, self.ctx));
                    Value::array(items)
                }
                _ => current.clone(),
            },
            SchemaNode::InsertBefore(f, position) => match current {
                Value::Array(arr) => {
                    let index = position(root, self.ctx).max(0);
                    self.insert(arr, index, f(root, self.ctx))
                }
                _ => current.clone(),
            },
            SchemaNode::InsertAfter(f, position) => match current {
                Value::Array(arr) => {
                    let index = position(root, self.ctx).saturating_add(1);
                    self.insert(arr, index, f(root, self.ctx))
                }
                _ => current.clone(),
            },
            SchemaNode::Assign(f) => match current {
                Value::Object(obj) => match f(root, current, self.ctx) {
                    Value::Object(partial) => {
                        trace!(keys = partial.len(), "assign");
                        Value::from(obj.merged(&partial))
                    }
                    _ => current.clone(),
                },
                _ => current.clone(),
            },
            SchemaNode::Delete => {
                trace!("delete");
                return Ok(Slot::Absent);
            }
            SchemaNode::Match(predicate, inner) => match current {
                Value::Array(arr) => self.elements(root, current, arr, &[(predicate, inner)])?,
                _ => current.clone(),
            },
            SchemaNode::Group(fields) => self.group(root, current, fields)?,
            SchemaNode::Reroot(inner) => return self.visit(current, current, inner),
            SchemaNode::Batch(nodes) => return self.batch(root, current, nodes),
        };
        Ok(Slot::Present(value))
    }

    fn insert(&self, arr: &Rc<Vec<Value>>, index: i64, item: Value) -> Value {
        let index = usize::try_from(index).unwrap_or(0).min(arr.len());
        trace!(index, "insert");
        let mut items = Vec::with_capacity(arr.len() + 1);
        items.extend(arr.iter().cloned());
        items.insert(index, item);
        Value::array(items)
    }

    /// Runs the non-matching nodes in order, then every sibling `Match` in a
    /// single pass over the array as it stood before that pass.
    fn batch(&self, root: &Value, current: &Value, nodes: &[SchemaNode<C>]) -> Result<Slot> {
        let mut value = current.clone();
        let mut rules = Vec::new();
        for node in nodes {
            if let SchemaNode::Match(predicate, inner) = node {
                rules.push((predicate, inner));
                continue;
            }
            value = match self.visit(root, &value, node)? {
                Slot::Present(v) => v,
                Slot::Absent => return Ok(Slot::Absent),
            };
        }
        if !rules.is_empty() {
            if let Value::Array(arr) = &value {
                value = self.elements(root, &value, arr, &rules)?;
            }
        }
        Ok(Slot::Present(value))
    }

    fn elements(
        &self,
        root: &Value,
        current: &Value,
        arr: &Rc<Vec<Value>>,
        rules: &[(&Predicate<C>, &Box<SchemaNode<C>>)],
    ) -> Result<Value> {
        let mut slots = Vec::with_capacity(arr.len());
        let mut changed = false;
        for (i, item) in arr.iter().enumerate() {
            let mut slot = Slot::Present(item.clone());
            for (predicate, inner) in rules {
                if !predicate(root, item, Key::Index(i), self.ctx) {
                    continue;
                }
                if let Slot::Present(value) = &slot {
                    slot = self
                        .visit(root, value, inner)
                        .map_err(|e| e.within(&i.to_string()))?;
                }
            }
            changed |= match &slot {
                Slot::Present(value) => !value.same(item),
                Slot::Absent => true,
            };
            slots.push(slot);
        }
        if !changed {
            return Ok(current.clone());
        }

        let prune = slots.iter().any(|slot| match slot {
            Slot::Present(value) => value.is_null(),
            Slot::Absent => true,
        });
        let items: Vec<Value> = slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Present(value) if !(prune && value.is_null()) => Some(value),
                _ => None,
            })
            .collect();
        trace!(before = arr.len(), after = items.len(), "elements");
        Ok(Value::array(items))
    }

    fn group(
        &self,
        root: &Value,
        current: &Value,
        fields: &[(String, SchemaNode<C>)],
    ) -> Result<Value> {
        match current {
            Value::Object(obj) => {
                let mut copy: Option<Object> = None;
                for (name, node) in fields {
                    let Some(child) = obj.get(name) else {
                        continue;
                    };
                    match self.visit(root, child, node).map_err(|e| e.within(name))? {
                        Slot::Present(value) if value.same(child) => {}
                        Slot::Present(value) => {
                            copy.get_or_insert_with(|| (**obj).clone()).insert(name.as_str(), value);
                        }
                        Slot::Absent => {
                            return Err(Error::DeleteOutsideArray { path: name.clone() });
                        }
                    }
                }
                Ok(copy.map(Value::from).unwrap_or_else(|| current.clone()))
            }
            Value::Array(arr) => {
                // Numeric keys address elements directly.
                let mut slots: Vec<Slot> = arr.iter().cloned().map(Slot::Present).collect();
                let mut changed = false;
                for (name, node) in fields {
                    let Some(index) = name.parse::<usize>().ok().filter(|i| *i < arr.len()) else {
                        continue;
                    };
                    let Slot::Present(child) = &slots[index] else {
                        continue;
                    };
                    let slot = self.visit(root, child, node).map_err(|e| e.within(name))?;
                    changed |= !matches!(&slot, Slot::Present(v) if v.same(child));
                    slots[index] = slot;
                }
                if !changed {
                    return Ok(current.clone());
                }
                Ok(Value::array(
                    slots
                        .into_iter()
                        .filter_map(|slot| match slot {
                            Slot::Present(value) => Some(value),
                            Slot::Absent => None,
                        })
                        .collect(),
                ))
            }
            _ => Ok(current.clone()),
        }
    }
}
