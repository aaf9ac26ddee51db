//! capi Patch - Redaction schemas and the patch engine.
//!
//! This crate provides:
//!
//! - `Schema`: the declarative, state-shaped description of a mutation
//! - `SchemaNode`: the compiled form walked by the engine
//! - `apply`: produces a new tree, copying only the touched paths
//! - `validate`: checks a schema against a sample state shape
//!
//! # Example
//!
//! ```rust
//! use capi_core::Value;
//! use capi_patch::{apply, Schema};
//! use serde_json::json;
//!
//! let old = Value::from(json!({"count": 0, "todos": []}));
//! let schema: Schema<()> = Schema::new().field(
//!     "count",
//!     Schema::new().set(|root, _, _| {
//!         Value::from(root.get("count").and_then(Value::as_i64).unwrap_or(0) + 1)
//!     }),
//! );
//!
//! let new = apply(&old, &schema.compile(), &()).unwrap();
//! assert_eq!(new.get("count"), Some(&Value::from(1)));
//! assert!(new.get("todos").unwrap().same(old.get("todos").unwrap()));
//! ```

#![no_std]

extern crate alloc;

mod apply;
mod node;
mod schema;
mod validate;

pub use apply::apply;
pub use node::{MakeFn, PositionFn, SchemaNode, UpdateFn};
pub use schema::Schema;
pub use validate::validate;
