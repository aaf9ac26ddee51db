//! Object-shaped path descriptions.
//!
//! A description is the authoring form of a mount: nested single-key levels,
//! `{where, select}` nodes or `[predicate, sub]` pairs, ending in a terminal.
//! It converts to and from the flat [`PathMap`] form.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use capi_core::{Error, Key, Result, Value};
use core::fmt;

use crate::step::{PathMap, PathStep, Predicate};

/// A nested description of a location in the state tree.
pub enum PathDescription<C, T = ()> {
    /// Named properties; exactly one is allowed when converting to a path
    Fields(Vec<(String, PathDescription<C, T>)>),
    /// `{where: predicate, select: sub}`
    Where(Predicate<C>, Box<PathDescription<C, T>>),
    /// `[predicate, sub]`
    Pair(Predicate<C>, Box<PathDescription<C, T>>),
    /// Re-root marker followed by the rest of the path
    Reroot(Box<PathDescription<C, T>>),
    /// Deepest level; `None` stands for `true`
    End(Option<T>),
}

impl<C, T: Clone> Clone for PathDescription<C, T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fields(fields) => Self::Fields(fields.clone()),
            Self::Where(p, next) => Self::Where(p.clone(), next.clone()),
            Self::Pair(p, next) => Self::Pair(p.clone(), next.clone()),
            Self::Reroot(next) => Self::Reroot(next.clone()),
            Self::End(t) => Self::End(t.clone()),
        }
    }
}

impl<C, T> PathDescription<C, T> {
    /// A single named level.
    pub fn field(name: impl Into<String>, next: Self) -> Self {
        Self::Fields(alloc::vec![(name.into(), next)])
    }

    /// A level with several properties (only valid as a terminal shape).
    pub fn fields<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Fields(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Nested single-key levels ending in `true`.
    pub fn keys(keys: &[&str]) -> Self {
        keys.iter()
            .rev()
            .fold(Self::end(), |next, key| Self::field(*key, next))
    }

    /// A `{where, select}` node.
    pub fn filter<F>(predicate: F, select: Self) -> Self
    where
        F: Fn(&Value, &Value, Key<'_>, &C) -> bool + 'static,
    {
        Self::Where(Rc::new(predicate), Box::new(select))
    }

    /// A `[predicate, sub]` pair.
    pub fn pair<F>(predicate: F, sub: Self) -> Self
    where
        F: Fn(&Value, &Value, Key<'_>, &C) -> bool + 'static,
    {
        Self::Pair(Rc::new(predicate), Box::new(sub))
    }

    /// The `true` terminal.
    pub fn end() -> Self {
        Self::End(None)
    }

    /// A terminal holding `value`.
    pub fn terminal(value: T) -> Self {
        Self::End(Some(value))
    }

    /// Structural equivalence.
    ///
    /// `Where` and `Pair` are interchangeable; predicates must be the same
    /// closure (pointer equality).
    pub fn equivalent(&self, other: &Self) -> bool
    where
        T: PartialEq,
    {
        match (self, other) {
            (Self::Fields(a), Self::Fields(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equivalent(vb))
            }
            (Self::Where(pa, a) | Self::Pair(pa, a), Self::Where(pb, b) | Self::Pair(pb, b)) => {
                Rc::ptr_eq(pa, pb) && a.equivalent(b)
            }
            (Self::Reroot(a), Self::Reroot(b)) => a.equivalent(b),
            (Self::End(a), Self::End(b)) => a == b,
            _ => false,
        }
    }
}

/// Flattens a description into a path map.
///
/// Fails with [`Error::AmbiguousPath`] when a level names more than one
/// property. An empty level ends the path.
pub fn to_path_sequence<C, T>(description: &PathDescription<C, T>) -> Result<PathMap<C>> {
    let mut steps = Vec::new();
    let mut level = description;
    loop {
        level = match level {
            PathDescription::Fields(fields) => match fields.as_slice() {
                [] => break,
                [(name, next)] => {
                    steps.push(PathStep::Key(name.clone()));
                    next
                }
                many => {
                    return Err(Error::AmbiguousPath {
                        properties: many.iter().map(|(k, _)| k.clone()).collect(),
                    })
                }
            },
            PathDescription::Where(predicate, next) | PathDescription::Pair(predicate, next) => {
                steps.push(PathStep::Where(predicate.clone()));
                next.as_ref()
            }
            PathDescription::Reroot(next) => {
                steps.push(PathStep::Reroot);
                next.as_ref()
            }
            PathDescription::End(_) => break,
        };
    }
    Ok(PathMap::from_steps(steps))
}

/// Builds the nested form of `map` with `terminal` at its deepest level.
///
/// Predicate steps come back as pairs.
pub fn to_path_description<C, T>(map: &PathMap<C>, terminal: Option<T>) -> PathDescription<C, T> {
    map.steps()
        .iter()
        .rev()
        .fold(PathDescription::End(terminal), |next, step| match step {
            PathStep::Key(key) => PathDescription::Fields(alloc::vec![(key.clone(), next)]),
            PathStep::Where(predicate) => PathDescription::Pair(predicate.clone(), Box::new(next)),
            PathStep::Reroot => PathDescription::Reroot(Box::new(next)),
        })
}

impl<C, T> fmt::Display for PathDescription<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(fields) => {
                f.write_str("{")?;
                for (i, (key, next)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", key, next)?;
                }
                f.write_str("}")
            }
            Self::Where(_, next) => write!(f, "{{where:?,select:{}}}", next),
            Self::Pair(_, next) => write!(f, "[?,{}]", next),
            Self::Reroot(next) => write!(f, "^{}", next),
            Self::End(None) => f.write_str("true"),
            Self::End(Some(_)) => f.write_str("*"),
        }
    }
}

impl<C, T> fmt::Debug for PathDescription<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
