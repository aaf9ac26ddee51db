//! State tree value definitions.
//!
//! This module defines the `Value` enum which represents any node of the
//! shared state tree. Arrays and objects are reference-counted so a tree can
//! be cloned in O(1) and untouched sub-trees keep their identity across
//! patches.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

/// A node of the state tree.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null value (also stands in for "undefined")
    Null,
    /// Boolean value
    Bool(bool),
    /// Number (stored as f64)
    Number(f64),
    /// UTF-8 string
    String(Rc<str>),
    /// Ordered sequence
    Array(Rc<Vec<Value>>),
    /// Keyed mapping
    Object(Rc<Object>),
}

/// A keyed mapping with keys sorted for binary-search lookup.
#[derive(Clone, Debug, Default)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

/// The position of a value inside its container, as handed to predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key<'a> {
    /// Position inside an array
    Index(usize),
    /// Property name inside an object
    Name(&'a str),
}

impl Object {
    /// Creates a new empty Object.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Creates an Object with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the object is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets a value by key using binary search. O(log n)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| &self.entries[idx].1)
    }

    /// Inserts a key-value pair, maintaining sorted order.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.binary_search_by(|(k, _)| k.as_str().cmp(&key)) {
            Ok(idx) => {
                self.entries[idx].1 = value;
            }
            Err(idx) => {
                self.entries.insert(idx, (key, value));
            }
        }
    }

    /// Removes a key and returns its value if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|idx| self.entries.remove(idx).1)
    }

    /// Returns true if the object contains the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .is_ok()
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Returns an iterator over key-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy of this object with every entry of `partial` written over it.
    pub fn merged(&self, partial: &Object) -> Object {
        let mut out = self.clone();
        for (k, v) in partial.iter() {
            out.insert(k, v.clone());
        }
        out
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries
            .iter()
            .zip(other.entries.iter())
            .all(|((k1, v1), (k2, v2))| k1 == k2 && v1 == v2)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut obj = Object::new();
        for (k, v) in iter {
            obj.insert(k, v);
        }
        obj
    }
}

impl Value {
    /// Builds an array value.
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    /// Builds an object value from key-value pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(Rc::new(entries.into_iter().collect()))
    }

    /// Strict equality as seen by change detection.
    ///
    /// Scalars compare by value, arrays and objects by reference: two
    /// structurally equal trees built separately are not the same.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns true if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is an array value.
    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns true if this is an object value.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// Returns the boolean value if this is a Bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number value if this is a Number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as i64 if this is a Number and it's an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => {
                let i = *n as i64;
                if (i as f64) == *n {
                    Some(i)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this is an Array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr.as_slice()),
            _ => None,
        }
    }

    /// Returns a reference to the object if this is an Object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Gets a value by key if this is an Object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Gets a value by index if this is an Array.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|arr| arr.get(index))
    }

    /// Gets a child by key: names address objects, indices address arrays.
    pub fn child(&self, key: Key<'_>) -> Option<&Value> {
        match key {
            Key::Index(i) => self.get_index(i),
            Key::Name(name) => self.get(name),
        }
    }

    /// Number of elements or entries; zero for scalars.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(arr) => arr.len(),
            Value::Object(obj) => obj.len(),
            _ => 0,
        }
    }

    /// Returns true for scalars and empty containers.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the tree into a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => match self.as_i64() {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            },
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
            Value::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// From implementations for convenient construction
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Number(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(Rc::new(v))
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(arr) => {
                Value::array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::object(map.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use serde_json::json;

    #[test]
    fn test_object_insert_and_get() {
        let mut obj = Object::new();
        obj.insert("name", Value::from("Alice"));
        obj.insert("age", Value::from(25));

        assert_eq!(obj.get("name"), Some(&Value::from("Alice")));
        assert_eq!(obj.get("age"), Some(&Value::Number(25.0)));
        assert_eq!(obj.get("missing"), None);
    }

    #[test]
    fn test_object_sorted_keys() {
        let obj: Object = [("z", Value::from(1)), ("a", Value::from(2)), ("m", Value::from(3))]
            .into_iter()
            .collect();

        let keys: Vec<_> = obj.keys().collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_object_merged() {
        let base: Object = [("text", Value::from("a")), ("done", Value::from(false))]
            .into_iter()
            .collect();
        let partial: Object = [("done", Value::from(true))].into_iter().collect();

        let merged = base.merged(&partial);
        assert_eq!(merged.get("done"), Some(&Value::Bool(true)));
        assert_eq!(merged.get("text"), Some(&Value::from("a")));
        assert_eq!(base.get("done"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_same_scalars_by_value() {
        assert!(Value::from(1).same(&Value::from(1)));
        assert!(Value::from("x").same(&Value::from("x")));
        assert!(!Value::from(1).same(&Value::from("1")));
        assert!(Value::Null.same(&Value::Null));
    }

    #[test]
    fn test_same_composites_by_reference() {
        let a = Value::array(vec![Value::from(1)]);
        let b = Value::array(vec![Value::from(1)]);
        let a2 = a.clone();

        assert!(a.same(&a2));
        assert!(!a.same(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_child_access() {
        let v = Value::from(json!({"rows": [{"cols": ["x"]}]}));
        let rows = v.child(Key::Name("rows")).unwrap();
        let row = rows.child(Key::Index(0)).unwrap();
        assert_eq!(row.get("cols").and_then(|c| c.get_index(0)), Some(&Value::from("x")));
        assert_eq!(rows.child(Key::Name("rows")), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let source = json!({"count": 1, "ratio": 0.5, "tags": ["a", null, true]});
        let value = Value::from(source.clone());
        assert_eq!(value.to_json(), source);
        assert_eq!(value.to_string(), "{\"count\":1,\"ratio\":0.5,\"tags\":[\"a\",null,true]}");
    }

    #[test]
    fn test_as_i64() {
        assert_eq!(Value::Number(42.0).as_i64(), Some(42));
        assert_eq!(Value::Number(4.5).as_i64(), None);
        assert_eq!(Value::from("4").as_i64(), None);
    }
}
