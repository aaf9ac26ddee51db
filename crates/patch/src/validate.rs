//! Schema validation against a sample state shape.
//!
//! Validation never fails: every finding is pushed as a [`Diagnostic`] and
//! the walk continues. Nothing here runs during dispatch.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::{Diagnostic, Value};

use crate::schema::Schema;

/// Checks `schema` (produced by the redaction named `subject`) against `shape`.
pub fn validate<C>(subject: &str, schema: &Schema<C>, shape: &Value, out: &mut Vec<Diagnostic>) {
    if schema.is_command() {
        out.push(Diagnostic::new(subject, "redaction did not return a schema"));
        return;
    }
    let mut checker = Checker { out };
    checker.level(subject, schema, shape);
}

struct Checker<'a> {
    out: &'a mut Vec<Diagnostic>,
}

impl Checker<'_> {
    fn report(&mut self, subject: &str, message: impl Into<String>) {
        self.out.push(Diagnostic::new(subject, message));
    }

    /// A rule applied at `shape`; element rules implicitly filter its elements.
    fn rule<C>(&mut self, path: &str, schema: &Schema<C>, shape: &Value, element_rule: bool) {
        if schema.delete && schema.filter.is_none() && !element_rule {
            self.report(path, "delete must be paired with where");
        }
        if schema.filter.is_none() && !element_rule {
            self.level(path, schema, shape);
            return;
        }
        if schema.filter.is_some() && !schema.has_mutation() && !has_nested(schema) {
            self.report(path, "where not paired with action");
        }
        match shape {
            Value::Array(items) => {
                // An empty sample gives nothing to check elements against.
                if let Some(element) = items.first() {
                    self.level(path, schema, element);
                }
            }
            _ => self.report(path, "corresponding state must be an Array"),
        }
    }

    /// Commands and nested rules applied at `shape` itself.
    fn level<C>(&mut self, path: &str, schema: &Schema<C>, shape: &Value) {
        let positional = schema.append.is_some()
            || schema.insert.is_some()
            || schema.before.is_some()
            || schema.after.is_some();
        if positional && !shape.is_array() {
            self.report(path, "corresponding state must be an Array");
        }

        let positioned = schema.before.is_some() || schema.after.is_some();
        let both = schema.before.is_some() && schema.after.is_some();
        if (schema.insert.is_some() && !positioned) || both || (positioned && schema.insert.is_none()) {
            self.report(path, "before/after must be paired with insert");
        }

        if schema.has_mutation() {
            for (name, _) in &schema.fields {
                self.report(path, format!("extraneous property {}", name));
            }
        } else {
            for (name, child) in &schema.fields {
                let child_path = format!("{}.{}", path, name);
                match child_shape(shape, name) {
                    Some(value) => self.rule(&child_path, child, value, false),
                    None => self.report(&child_path, "does not have corresponding state shape"),
                }
            }
        }

        if let Some(select) = &schema.select {
            self.rule(&format!("{}.select", path), select, shape, false);
        }
        for item in &schema.items {
            self.rule(&format!("{}._", path), item, shape, true);
        }
    }
}

fn has_nested<C>(schema: &Schema<C>) -> bool {
    schema.select.is_some() || !schema.fields.is_empty() || !schema.items.is_empty()
}

fn child_shape<'a>(shape: &'a Value, name: &str) -> Option<&'a Value> {
    match shape {
        Value::Object(obj) => obj.get(name),
        Value::Array(arr) => name.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    }
}
