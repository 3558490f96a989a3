//! Domain error types

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A keyword that has no entry in one of the type tables.
///
/// Validation turns this into a [`Violation`]; seeing it anywhere else means
/// the validator and the tables disagree about what is supported.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported {table} keyword: {value:?}")]
pub struct UnsupportedValueError {
    /// Name of the table the lookup was made against.
    pub table: &'static str,
    /// The keyword that was looked up.
    pub value: String,
}

impl UnsupportedValueError {
    /// Creates a new lookup error.
    #[must_use]
    pub fn new(table: &'static str, value: impl Into<String>) -> Self {
        Self {
            table,
            value: value.into(),
        }
    }
}

/// A single rule broken by the configuration document.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// A required field is missing.
    #[error("required field is missing")]
    Required,

    /// The field holds a value of the wrong type.
    #[error("must be of {expected} type")]
    Type {
        /// Human readable name of the expected type.
        expected: &'static str,
    },

    /// `null` given to a field that is not nullable.
    #[error("null value not allowed")]
    NotNullable,

    /// The value is not one of the allowed keywords.
    #[error("unallowed value {value:?}, expected one of: {}", allowed.join(", "))]
    Allowed {
        /// The rejected value.
        value: String,
        /// Every accepted keyword.
        allowed: Vec<String>,
    },

    /// A string or list that must not be empty is empty.
    #[error("empty values not allowed")]
    Empty,

    /// A list is shorter than required.
    #[error("min length is {min}, got {actual}")]
    MinLength {
        /// Minimum accepted length.
        min: usize,
        /// Length found in the document.
        actual: usize,
    },

    /// A number is NaN or infinite.
    #[error("must be a finite number")]
    NotFinite,

    /// A key that the schema does not know.
    #[error("unknown field")]
    Unknown,

    /// More arguments than operations.
    #[error("{arguments} argument entries provided for {operations} operations")]
    TooManyArguments {
        /// Number of argument entries.
        arguments: usize,
        /// Number of operations.
        operations: usize,
    },

    /// An argument entry is a mapping.
    #[error("field cannot be a mapping")]
    NestedMapping,

    /// An argument entry nests lists more than one level deep.
    #[error("argument lists cannot be nested")]
    NestedList,

    /// An operation name that is not a C++ identifier.
    #[error("{name:?} is not a valid operation name")]
    InvalidOperation {
        /// The rejected name.
        name: String,
    },

    /// Two fields that exclude each other were both given.
    #[error("cannot be combined with `{other}`")]
    Excludes {
        /// The conflicting sibling field.
        other: &'static str,
    },

    /// Normalization constants that cannot be applied across the channels.
    #[error("length {length} is not broadcastable to {channels} channels")]
    NotBroadcastable {
        /// Number of constants given.
        length: usize,
        /// Channel dimension of the input shape.
        channels: i64,
    },
}

/// A rule broken at a specific field of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted path to the field, e.g. `input.shape[2]`.
    pub path: String,
    /// What is wrong with it.
    #[serde(flatten)]
    pub rule: Rule,
}

impl Violation {
    /// Creates a violation for the given field path.
    #[must_use]
    pub fn new(path: impl Into<String>, rule: Rule) -> Self {
        Self {
            path: path.into(),
            rule,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<document>: {}", self.rule)
        } else {
            write!(f, "{}: {}", self.path, self.rule)
        }
    }
}

/// The configuration document failed validation.
///
/// Carries every violation found, in document order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid configuration ({} violation(s)): {}", violations.len(), join(violations))]
pub struct SchemaError {
    /// Every broken rule.
    pub violations: Vec<Violation>,
}

impl SchemaError {
    /// Creates an error from collected violations.
    #[must_use]
    pub const fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns true if some violation was reported at `path`.
    #[must_use]
    pub fn has_violation_at(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    /// Returns the rules broken at `path`.
    pub fn rules_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.violations
            .iter()
            .filter(move |v| v.path == path)
            .map(|v| &v.rule)
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
