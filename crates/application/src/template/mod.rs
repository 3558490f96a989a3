//! Skeleton rendering module
//!
//! Provides parsing and substitution of `{{NAME}}` placeholders in the
//! C++ handler skeleton.
//!
//! # Usage
//!
//! ```
//! use torchgen_application::template::{FragmentSet, render};
//!
//! let mut fragments = FragmentSet::new();
//! fragments.insert("MODEL_PATH", "\"/opt/model.ptc\"");
//!
//! let source = render(&fragments, "constexpr auto model_path = {{MODEL_PATH}};").unwrap();
//! assert_eq!(source, "constexpr auto model_path = \"/opt/model.ptc\";");
//! ```

pub mod parser;
pub mod renderer;

use std::collections::BTreeMap;

use thiserror::Error;

pub use parser::{PlaceholderRef, is_valid_placeholder_name, parse_placeholders, placeholder_names};
pub use renderer::render;

/// Errors raised while filling the skeleton.
///
/// These point at a mismatch between the skeleton and the emitters, never at
/// the user's configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateRenderError {
    /// Placeholders with no emitted fragment.
    #[error("no fragment for placeholder(s): {}", .0.join(", "))]
    MissingFragments(Vec<String>),

    /// A `{{` with no closing `}}`.
    #[error("unterminated placeholder marker at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening braces.
        offset: usize,
    },
}

/// Named source fragments to substitute into the skeleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentSet {
    fragments: BTreeMap<String, String>,
}

impl FragmentSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragments: BTreeMap::new(),
        }
    }

    /// Sets the fragment for `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fragments.insert(name.into(), value.into());
    }

    /// Returns the fragment for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fragments.get(name).map(String::as_str)
    }

    /// Moves every fragment of `other` into this set.
    pub fn merge(&mut self, other: Self) {
        self.fragments.extend(other.fragments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_overrides() {
        let mut first = FragmentSet::new();
        first.insert("A", "1");
        first.insert("B", "2");
        let mut second = FragmentSet::new();
        second.insert("B", "3");

        first.merge(second);
        let mut expected = FragmentSet::new();
        expected.insert("A", "1");
        expected.insert("B", "3");
        assert_eq!(first, expected);
    }

    #[test]
    fn test_error_messages() {
        let err = TemplateRenderError::MissingFragments(vec!["A".into(), "B".into()]);
        assert_eq!(err.to_string(), "no fragment for placeholder(s): A, B");
    }
}
