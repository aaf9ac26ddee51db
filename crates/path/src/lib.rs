//! capi Path - Locating API slices inside a composed state tree.
//!
//! A mount is authored as a nested [`PathDescription`] and flattened into a
//! [`PathMap`]: literal keys, element predicates and re-root markers. Path
//! maps compose, so an API mounted inside another API's slice addresses its
//! state through both mounts.
//!
//! # Example
//!
//! ```rust
//! use capi_core::Value;
//! use capi_path::{to_path_sequence, PathDescription};
//! use serde_json::json;
//!
//! let state = Value::from(json!({"data": {"multi": [{"id": 1}, {"id": 2}]}}));
//! let mount: PathDescription<()> = PathDescription::field(
//!     "data",
//!     PathDescription::field(
//!         "multi",
//!         PathDescription::pair(
//!             |_, item, _, _| item.get("id") == Some(&Value::from(2)),
//!             PathDescription::end(),
//!         ),
//!     ),
//! );
//!
//! let path = to_path_sequence(&mount).unwrap();
//! let slice = path.resolve(&state, &()).unwrap();
//! assert_eq!(slice.get("id"), Some(&Value::from(2)));
//! ```

#![no_std]

extern crate alloc;

mod description;
mod step;

pub use description::{to_path_description, to_path_sequence, PathDescription};
pub use step::{compose_paths, resolve, PathMap, PathStep, Predicate};
