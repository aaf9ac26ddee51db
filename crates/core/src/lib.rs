//! capi Core - State tree values and shared types for capi.
//!
//! This crate provides the foundational types shared by every capi crate:
//!
//! - `Value`: an immutable, reference-counted state tree node
//! - `Object`: a keyed mapping with sorted keys
//! - `Key`: the position of a value inside its container
//! - `Error`: error types for patching, path mapping and dispatch
//! - `Diagnostic`: a single validation finding
//!
//! # Example
//!
//! ```rust
//! use capi_core::Value;
//! use serde_json::json;
//!
//! let state = Value::from(json!({"count": 0, "todos": []}));
//! let copy = state.clone();
//!
//! // Clones share structure: identity is preserved.
//! assert!(state.same(&copy));
//! assert_eq!(state.get("count"), Some(&Value::from(0)));
//! ```

#![no_std]

extern crate alloc;

mod error;
mod value;

pub use error::{Diagnostic, Error, Result};
pub use value::{Key, Object, Value};
