use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Rendered HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    /// Wraps trusted markup without escaping.
    #[must_use]
    pub fn raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Escapes plain text into markup.
    #[must_use]
    pub fn text(value: &str) -> Self {
        Self(escape(value))
    }

    /// Returns the markup as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the owned markup string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Appends another fragment.
    pub fn push(&mut self, other: &Markup) {
        self.0.push_str(other.as_str());
    }

    /// Appends trusted markup.
    pub fn push_raw(&mut self, value: &str) {
        self.0.push_str(value);
    }

    /// Returns whether the fragment is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Markup {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Escapes text for use in HTML bodies and attribute values.
#[must_use]
pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
