//! Spec validation against a sample state shape.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use capi_core::{Diagnostic, Value};
use capi_path::{PathMap, PathStep};
use tracing::warn;

use crate::api::ApiInner;
use crate::context::Context;
use crate::registry::Node;
use crate::spec::Declaration;

/// Findings of [`Api::validate`](crate::Api::validate).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    diagnostics: Vec<Diagnostic>,
}

impl Validation {
    /// Returns true when nothing was reported.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Every finding, in report order.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of findings.
    #[inline]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true when nothing was reported.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Findings rendered as `capi - subject: message`.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    /// Number of findings whose text contains `needle`.
    pub fn count_matching(&self, needle: &str) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.to_string().contains(needle))
            .count()
    }
}

pub(crate) fn check(api: &ApiInner, shape: &Value) -> Validation {
    let mount = api.mount();
    let mut out = Vec::new();
    level(api.registry.root(), &mount, shape, &mut out);
    for diagnostic in &out {
        warn!(api = api.config.label.as_str(), "{}", diagnostic);
    }
    Validation { diagnostics: out }
}

fn level(node: &Node, mount: &PathMap<Context>, shape: &Value, out: &mut Vec<Diagnostic>) {
    for name in &node.order {
        let binding = match node.binding(name) {
            Some(binding) => binding,
            None => continue,
        };
        let factory = match &binding.declaration {
            Declaration::Redaction(factory) => factory,
            _ => continue,
        };
        let subject = node.qualify(name);
        let no_args: &[Value] = &[];
        let schema = match factory(no_args) {
            Ok(schema) => schema,
            Err(err) => {
                out.push(Diagnostic::new(subject, format!("redaction returned an error: {}", err)));
                continue;
            }
        };
        let path = PathMap::compose(mount, &binding.mount);
        match sample(shape, &path) {
            Sample::Found(slice) => capi_patch::validate(&subject, &schema, slice, out),
            Sample::Missing => out.push(Diagnostic::new(subject, "does not have corresponding state shape")),
            Sample::Unknown => {}
        }
    }
    for name in &node.duplicates {
        out.push(Diagnostic::new(node.qualify(name), "is declared more than once"));
    }
    for name in &node.child_order {
        if let Some(child) = node.child(name) {
            level(child, mount, shape, out);
        }
    }
}

enum Sample<'a> {
    Found(&'a Value),
    Missing,
    /// An empty array stands in for the elements a predicate would pick
    Unknown,
}

/// Walks a mount over a sample shape; predicates pick the first element.
fn sample<'a>(shape: &'a Value, path: &PathMap<Context>) -> Sample<'a> {
    let mut slice = shape;
    for step in path.steps() {
        slice = match step {
            PathStep::Reroot => continue,
            PathStep::Key(key) => match child_shape(slice, key) {
                Some(next) => next,
                None => return Sample::Missing,
            },
            PathStep::Where(_) => match slice.as_array() {
                Some([]) => return Sample::Unknown,
                Some([first, ..]) => first,
                None => return Sample::Missing,
            },
        };
    }
    Sample::Found(slice)
}

fn child_shape<'a>(shape: &'a Value, key: &str) -> Option<&'a Value> {
    match shape {
        Value::Object(obj) => obj.get(key),
        Value::Array(arr) => key.parse::<usize>().ok().and_then(|i| arr.get(i)),
        _ => None,
    }
}
