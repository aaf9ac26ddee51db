//! Declarative redaction schemas.
//!
//! A [`Schema`] mirrors the shape of the state it targets. Each level either
//! names child properties (continuing the walk) or carries commands applied
//! at that position. [`Schema::compile`] turns the authoring form into a
//! [`SchemaNode`] tree the engine walks without any shape sniffing.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::{Key, Value};
use capi_path::Predicate;

use crate::node::{MakeFn, PositionFn, SchemaNode, UpdateFn};

/// The authoring form of a redaction schema.
pub struct Schema<C> {
    pub(crate) set: Option<UpdateFn<C>>,
    pub(crate) append: Option<MakeFn<C>>,
    pub(crate) insert: Option<MakeFn<C>>,
    pub(crate) before: Option<PositionFn<C>>,
    pub(crate) after: Option<PositionFn<C>>,
    pub(crate) assign: Option<UpdateFn<C>>,
    pub(crate) delete: bool,
    pub(crate) filter: Option<Predicate<C>>,
    pub(crate) select: Option<Box<Schema<C>>>,
    pub(crate) fields: Vec<(String, Schema<C>)>,
    pub(crate) items: Vec<Schema<C>>,
}

impl<C> Default for Schema<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Clone for Schema<C> {
    fn clone(&self) -> Self {
        Self {
            set: self.set.clone(),
            append: self.append.clone(),
            insert: self.insert.clone(),
            before: self.before.clone(),
            after: self.after.clone(),
            assign: self.assign.clone(),
            delete: self.delete,
            filter: self.filter.clone(),
            select: self.select.clone(),
            fields: self.fields.clone(),
            items: self.items.clone(),
        }
    }
}

impl<C> Schema<C> {
    /// Creates an empty schema (a no-op when applied).
    pub fn new() -> Self {
        Self {
            set: None,
            append: None,
            insert: None,
            before: None,
            after: None,
            assign: None,
            delete: false,
            filter: None,
            select: None,
            fields: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Ordered-pair shorthand: `[predicate, sub]` is `{where: predicate, select: sub}`.
    pub fn pair<F>(predicate: F, sub: Schema<C>) -> Self
    where
        F: Fn(&Value, &Value, Key<'_>, &C) -> bool + 'static,
    {
        Self::new().filter(predicate).select(sub)
    }

    /// Adds a rule for the child property `name`.
    pub fn field(mut self, name: impl Into<String>, schema: Schema<C>) -> Self {
        self.fields.push((name.into(), schema));
        self
    }

    /// Replaces the value: `(root, current, ctx) -> value`.
    pub fn set<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value, &C) -> Value + 'static,
    {
        self.set = Some(Rc::new(f));
        self
    }

    /// Appends one element to an array: `(root, ctx) -> element`.
    pub fn append<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &C) -> Value + 'static,
    {
        self.append = Some(Rc::new(f));
        self
    }

    /// Inserts one element into an array, positioned by `before` or `after`.
    pub fn insert<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &C) -> Value + 'static,
    {
        self.insert = Some(Rc::new(f));
        self
    }

    /// Inserts at `max(index, 0)`.
    pub fn before<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &C) -> i64 + 'static,
    {
        self.before = Some(Rc::new(f));
        self
    }

    /// Inserts at `index + 1`.
    pub fn after<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &C) -> i64 + 'static,
    {
        self.after = Some(Rc::new(f));
        self
    }

    /// Shallow-merges a partial object: `(root, current, ctx) -> partial`.
    pub fn assign<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value, &Value, &C) -> Value + 'static,
    {
        self.assign = Some(Rc::new(f));
        self
    }

    /// Removes the matched element from its array.
    pub fn delete(mut self) -> Self {
        self.delete = true;
        self
    }

    /// Restricts the rule to the array elements the predicate accepts.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &Value, Key<'_>, &C) -> bool + 'static,
    {
        self.filter = Some(Rc::new(predicate));
        self
    }

    /// Sub-schema applied to each matched element.
    pub fn select(mut self, schema: Schema<C>) -> Self {
        self.select = Some(Box::new(schema));
        self
    }

    /// Unnamed rule applied to the elements of this array.
    pub fn item(mut self, schema: Schema<C>) -> Self {
        self.items.push(schema);
        self
    }

    /// True when the level carries a mutation command.
    pub(crate) fn has_mutation(&self) -> bool {
        self.delete
            || self.set.is_some()
            || self.append.is_some()
            || self.insert.is_some()
            || self.assign.is_some()
    }

    /// True when the level carries any command key, including `where` and `select`.
    pub fn is_command(&self) -> bool {
        self.has_mutation()
            || self.filter.is_some()
            || self.select.is_some()
            || self.before.is_some()
            || self.after.is_some()
    }
}

impl<C: 'static> Schema<C> {
    /// Compiles into the engine's node tree.
    pub fn compile(&self) -> SchemaNode<C> {
        let body = self.compile_body();
        match &self.filter {
            Some(predicate) => SchemaNode::Match(predicate.clone(), Box::new(body)),
            None => body,
        }
    }

    fn compile_element(&self) -> SchemaNode<C> {
        match &self.filter {
            Some(_) => self.compile(),
            None => SchemaNode::Match(Rc::new(always::<C>), Box::new(self.compile_body())),
        }
    }

    fn compile_body(&self) -> SchemaNode<C> {
        if self.delete {
            return SchemaNode::Delete;
        }
        let mut parts = Vec::new();
        if let Some(command) = self.compile_command() {
            parts.push(command);
        }
        if let Some(select) = &self.select {
            parts.push(select.compile());
        }
        if !self.fields.is_empty() {
            parts.push(SchemaNode::Group(
                self.fields
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.compile()))
                    .collect(),
            ));
        }
        parts.extend(self.items.iter().map(Schema::compile_element));
        SchemaNode::batch(parts)
    }

    fn compile_command(&self) -> Option<SchemaNode<C>> {
        if let Some(f) = &self.set {
            return Some(SchemaNode::Set(f.clone()));
        }
        if let Some(f) = &self.append {
            return Some(SchemaNode::Append(f.clone()));
        }
        if let Some(f) = &self.insert {
            return Some(match (&self.before, &self.after) {
                (Some(before), _) => SchemaNode::InsertBefore(f.clone(), before.clone()),
                (None, Some(after)) => SchemaNode::InsertAfter(f.clone(), after.clone()),
                (None, None) => SchemaNode::Append(f.clone()),
            });
        }
        self.assign.as_ref().map(|f| SchemaNode::Assign(f.clone()))
    }
}

fn always<C>(_: &Value, _: &Value, _: Key<'_>, _: &C) -> bool {
    true
}
