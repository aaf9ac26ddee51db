//! capi - Declarative selectors, redactions and thunks over one state tree.
//!
//! This crate ties the capi pieces together. A [`Spec`] names what
//! consumers can read (selectors, static values) and what they can call
//! (redactions, thunks). [`Api`] builds the spec once, mounts it on a
//! [`Store`], and hands each consumer a [`Context`].
//!
//! # Core Components
//!
//! - `Spec`: the schema registry authoring form, nested and mounted
//! - `Api`: `mount`, `state`, `validate`, `mock` / `unmock`, `attach`
//! - `Context`: per-consumer reads, calls, sub-contexts and render tracking
//! - `Mock`: call recorders for tests
//! - `ApiConfig`: log label and state tracing
//!
//! # Example
//!
//! ```rust
//! use capi::{Api, Schema, Spec, Store, Value};
//! use serde_json::json;
//!
//! let spec = Spec::new()
//!     .selector("count", |state, _| Ok(state.get("count").cloned().unwrap_or_default()))
//!     .redaction("increment", |_| {
//!         Ok(Schema::new().field(
//!             "count",
//!             Schema::new().set(|_, count, _| Value::from(count.as_i64().unwrap_or(0) + 1)),
//!         ))
//!     });
//!
//! let api = Api::new(spec).unwrap();
//! api.mount(Store::new(Value::from(json!({"count": 0}))), None).unwrap();
//!
//! let ctx = api.context(Value::Null);
//! ctx.call("increment", &[]).unwrap();
//! assert_eq!(ctx.get("count").unwrap(), Value::from(1));
//! ```

extern crate alloc;

pub mod api;
pub mod config;
pub mod context;
pub mod mock;
mod registry;
pub mod spec;
pub mod validate;

pub use api::Api;
pub use config::ApiConfig;
pub use context::{Context, RenderFn};
pub use mock::Mock;
pub use spec::{DeferredFn, RedactionFn, Spec, Thunk, ThunkFn};
pub use validate::Validation;

pub use capi_core::{Diagnostic, Error, Key, Object, Result, Value};
pub use capi_patch::Schema;
pub use capi_path::PathDescription;
pub use capi_reactive::{Memo, StateChange, Store};
