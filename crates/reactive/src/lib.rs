//! capi Reactive - Store, change events and selector bookkeeping for capi.
//!
//! This crate implements the reactive half of capi: a store holding the
//! single root tree, subscriptions notified when a dispatch replaces that
//! tree, and the pieces a consumer needs to decide whether it must render
//! again.
//!
//! # Core Concepts
//!
//! - `Store`: the shared root tree; `dispatch` replaces it and notifies
//! - `StateChange`: the "tree replaced" event subscribers receive
//! - `SubscriptionManager`: the subscriber table behind a store
//! - `Memo`: the argument-tuple cache behind memoized selectors
//! - `Selector` / `Resolve`: explicit selector resolution
//! - `ReadCycle`: which selectors a consumer read and what it saw
//!
//! # Example
//!
//! ```rust
//! use capi_core::Value;
//! use capi_reactive::Store;
//! use serde_json::json;
//!
//! let store = Store::new(Value::from(json!({"count": 0})));
//! store.subscribe(|change| {
//!     assert_eq!(change.current.get("count"), Some(&Value::from(1)));
//! });
//!
//! let replaced = store
//!     .dispatch("increment", |_| Ok(Value::from(json!({"count": 1}))))
//!     .unwrap();
//! assert!(replaced);
//! ```

#![no_std]

extern crate alloc;

pub mod cycle;
pub mod event;
pub mod memo;
pub mod selector;
pub mod store;
pub mod subscription;

pub use cycle::ReadCycle;
pub use event::StateChange;
pub use memo::{ComputeFn, Memo};
pub use selector::{InvokeFn, MemoSelector, Resolve, SelectFn, Selector, SimpleSelector};
pub use store::Store;
pub use subscription::{ChangeCallback, SubscriptionId, SubscriptionManager};
