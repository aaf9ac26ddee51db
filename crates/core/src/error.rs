//! Error and diagnostic types for capi.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Result type alias for capi operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for capi operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// No selector, redaction, thunk, prop or value by that name.
    #[error("unknown name: {name}")]
    UnknownName { name: String },
    /// The API has not been mounted on a store yet.
    #[error("api is not mounted on a store")]
    NotMounted,
    /// A path description level with more than one property.
    #[error("ambiguous path: level has properties {}", .properties.join(", "))]
    AmbiguousPath { properties: Vec<String> },
    /// `delete` reached a position that is not an array element.
    #[error("delete outside an array element at '{path}'")]
    DeleteOutsideArray { path: String },
    /// A redaction factory produced something that is not a schema.
    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
    /// A deferred thunk was invoked synchronously.
    #[error("thunk '{name}' is asynchronous, use call_async")]
    AsyncThunk { name: String },
    /// Error raised by user code (selectors, thunks, factories).
    #[error("{message}")]
    Custom { message: String },
}

impl Error {
    /// Creates an unknown name error.
    pub fn unknown_name(name: impl Into<String>) -> Self {
        Error::UnknownName { name: name.into() }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates an error carrying a free-form message.
    pub fn custom(message: impl fmt::Display) -> Self {
        Error::Custom {
            message: format!("{}", message),
        }
    }

    /// Prefixes the location of a delete error with an enclosing path segment.
    pub fn within(self, segment: &str) -> Self {
        match self {
            Error::DeleteOutsideArray { path } if path.is_empty() => Error::DeleteOutsideArray {
                path: String::from(segment),
            },
            Error::DeleteOutsideArray { path } => Error::DeleteOutsideArray {
                path: format!("{}.{}", segment, path),
            },
            other => other,
        }
    }
}

/// A single validation finding. Validation collects these instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// What the finding is about, e.g. `addTodo.todos.insert`
    pub subject: String,
    /// Human readable description
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "capi - {}: {}", self.subject, self.message)
    }
}
