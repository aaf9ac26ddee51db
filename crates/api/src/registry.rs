//! Flattened spec tree.
//!
//! Building the registry walks the spec once: declarations without an api
//! name land in the enclosing level, named specs open a child level, and
//! every binding remembers the mount chain it was declared under.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::Result;
use capi_path::{to_path_sequence, PathMap};
use core::cell::Cell;

use crate::context::Context;
use crate::spec::{Declaration, Spec};

/// A named declaration and where its slice lives.
pub(crate) struct Binding {
    pub(crate) declaration: Declaration,
    /// Composed spec mounts, without the store mount
    pub(crate) mount: PathMap<Context>,
}

/// One context level.
#[derive(Default)]
pub(crate) struct Node {
    /// Qualified name used as a diagnostic prefix; empty at the root
    pub(crate) path: String,
    pub(crate) bindings: hashbrown::HashMap<String, Binding>,
    /// Binding names in declaration order
    pub(crate) order: Vec<String>,
    /// Names declared more than once, reported by validation
    pub(crate) duplicates: Vec<String>,
    pub(crate) children: hashbrown::HashMap<String, Rc<Node>>,
    pub(crate) child_order: Vec<String>,
}

impl Node {
    pub(crate) fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub(crate) fn child(&self, name: &str) -> Option<&Rc<Node>> {
        self.children.get(name)
    }

    /// `prefix.name`, or `name` at the root.
    pub(crate) fn qualify(&self, name: &str) -> String {
        if self.path.is_empty() {
            String::from(name)
        } else {
            alloc::format!("{}.{}", self.path, name)
        }
    }
}

/// The built spec tree and the consumer instance counter.
pub(crate) struct Registry {
    root: Rc<Node>,
    next_id: Cell<u64>,
}

impl Registry {
    /// Builds the tree; fails when a mount description is ambiguous.
    pub(crate) fn build(spec: &Spec) -> Result<Self> {
        let mut root = Builder::default();
        root.collect(spec, &PathMap::new())?;
        Ok(Self {
            root: Rc::new(root.finish(String::new())),
            next_id: Cell::new(1),
        })
    }

    #[inline]
    pub(crate) fn root(&self) -> &Rc<Node> {
        &self.root
    }

    /// Hands out the next consumer id.
    pub(crate) fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

#[derive(Default)]
struct Builder {
    bindings: Vec<(String, Binding)>,
    children: Vec<(String, Builder)>,
}

impl Builder {
    fn collect(&mut self, spec: &Spec, parent: &PathMap<Context>) -> Result<()> {
        let own = match &spec.mount {
            Some(description) => to_path_sequence(description)?,
            None => PathMap::new(),
        };
        let mount = PathMap::compose(parent, &own);
        let level = match &spec.api {
            Some(name) => self.child(name),
            None => self,
        };
        for (name, declaration) in &spec.declarations {
            level.bindings.push((
                name.clone(),
                Binding {
                    declaration: declaration.clone(),
                    mount: mount.clone(),
                },
            ));
        }
        for nested in &spec.specs {
            level.collect(nested, &mount)?;
        }
        Ok(())
    }

    fn child(&mut self, name: &str) -> &mut Builder {
        let index = match self.children.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.children.push((String::from(name), Builder::default()));
                self.children.len() - 1
            }
        };
        &mut self.children[index].1
    }

    fn finish(self, path: String) -> Node {
        let mut node = Node {
            path,
            ..Node::default()
        };
        for (name, binding) in self.bindings {
            if node.bindings.insert(name.clone(), binding).is_some() {
                if !node.duplicates.contains(&name) {
                    node.duplicates.push(name);
                }
            } else {
                node.order.push(name);
            }
        }
        for (name, builder) in self.children {
            let child = builder.finish(node.qualify(&name));
            node.child_order.push(name.clone());
            node.children.insert(name, Rc::new(child));
        }
        node
    }
}
