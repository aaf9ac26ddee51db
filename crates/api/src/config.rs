//! Api configuration.

use alloc::string::String;

/// Options for [`Api::with_config`](crate::Api::with_config).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Name carried in log fields
    pub label: String,
    /// Emit the whole state as JSON at trace level after each change
    pub trace_state: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            label: String::from("capi"),
            trace_state: false,
        }
    }
}

impl ApiConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label used in log fields.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Enables or disables state tracing.
    pub fn trace_state(mut self, enabled: bool) -> Self {
        self.trace_state = enabled;
        self
    }
}
