//! Helpers for walking a raw configuration document.

use std::fmt;

use serde_yaml::{Mapping, Value};

/// Dotted path of a field inside the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    /// The document root.
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    /// Path of a key below this one.
    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_string())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    /// Path of a list element below this one.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// State of a key in a mapping.
#[derive(Debug, Clone, Copy)]
pub enum Field<'a> {
    /// The key is absent.
    Missing,
    /// The key is present with an explicit `null`.
    Null,
    /// The key holds a value.
    Value(&'a Value),
}

/// Looks up `key` in `mapping`.
#[must_use]
pub fn lookup<'a>(mapping: &'a Mapping, key: &str) -> Field<'a> {
    match mapping.get(key) {
        None => Field::Missing,
        Some(Value::Null) => Field::Null,
        Some(value) => Field::Value(value),
    }
}

/// Renders a mapping key for use in a field path.
#[must_use]
pub fn key_name(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => "<complex key>".to_string(),
    }
}

/// Returns true if `name` is a C++ identifier, optionally `::`-qualified.
///
/// ```
/// use torchgen_application::validator::document::is_operation_name;
///
/// assert!(is_operation_name("argmax"));
/// assert!(is_operation_name("torch::nn::functional::softmax"));
/// assert!(!is_operation_name("argmax(output)"));
/// ```
#[must_use]
pub fn is_operation_name(name: &str) -> bool {
    let name = name.strip_prefix("::").unwrap_or(name);
    !name.is_empty() && name.split("::").all(is_identifier)
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
