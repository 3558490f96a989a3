//! Schema validation and normalization of configuration documents.
//!
//! [`SettingsValidator`] walks a raw YAML document, fills in defaults and
//! builds [`Settings`]. It never stops at the first problem: every violation
//! in the document is collected and returned together in a [`SchemaError`].

pub mod document;

use std::fmt::Display;
use std::str::FromStr;

use serde_yaml::{Mapping, Value};
use torchgen_domain::settings::{
    DEFAULT_DATA_FIELD, DEFAULT_MODEL_PATH, DEFAULT_OUTPUT_NAME, DEFAULT_RESULT_NAME,
};
use torchgen_domain::types::keywords;
use torchgen_domain::{
    Argument, CastType, Computation, InputSettings, InputType, Literal, Normalize, OutputSettings,
    ResultSettings, ReturnSettings, ReturnType, Rule, SchemaError, Settings, ShapeDim,
    UnsupportedValueError, Violation,
};

use document::{Field, FieldPath, is_operation_name, key_name, lookup};

const ROOT_FIELDS: &[&str] = &[
    "grad",
    "optimize",
    "validate_json",
    "model",
    "input",
    "normalize",
    "return",
];
const INPUT_FIELDS: &[&str] = &[
    "name",
    "validate",
    "type",
    "shape",
    "validate_shape",
    "cast",
    "divide",
];
const NORMALIZE_FIELDS: &[&str] = &["means", "stddevs"];
const RETURN_FIELDS: &[&str] = &["output", "result"];
const OUTPUT_FIELDS: &[&str] = &["name", "type", "item"];
const RESULT_FIELDS: &[&str] = &["name", "type", "item", "operations", "arguments", "code"];

/// Minimum number of shape entries (batch dimension plus at least one more).
pub const MIN_SHAPE_LEN: usize = 2;

/// Validates `document` and returns it normalized.
///
/// # Errors
///
/// Returns a [`SchemaError`] carrying every violation in the document.
pub fn validate_and_normalize(document: &Value) -> Result<Settings, SchemaError> {
    SettingsValidator::new().validate(document)
}

/// Channel dimension as far as the shape tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channels {
    /// The shape is missing or invalid.
    Unknown,
    /// `shape[1]` is read from the request or inferred by `reshape`.
    Dynamic,
    /// `shape[1]` is a fixed positive size.
    Fixed(i64),
}

/// Single-use validator for one configuration document.
#[derive(Debug)]
pub struct SettingsValidator {
    violations: Vec<Violation>,
    channels: Channels,
}

impl Default for SettingsValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsValidator {
    /// Creates a validator with no recorded violations.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
            channels: Channels::Unknown,
        }
    }

    /// Validates the document, consuming the validator.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if any rule is broken.
    pub fn validate(mut self, document: &Value) -> Result<Settings, SchemaError> {
        let settings = self.settings(document);
        tracing::debug!(violations = self.violations.len(), "validated configuration");
        match settings {
            Some(settings) if self.violations.is_empty() => Ok(settings),
            _ => Err(SchemaError::new(self.violations)),
        }
    }

    fn report(&mut self, path: &FieldPath, rule: Rule) {
        self.violations.push(Violation::new(path.as_str(), rule));
    }

    // -- sections ----------------------------------------------------------

    fn settings(&mut self, document: &Value) -> Option<Settings> {
        let root = FieldPath::root();
        let map = self.section(document, &root, ROOT_FIELDS)?;

        let grad = self.boolean(map, &root, "grad", false);
        let optimize = self.boolean(map, &root, "optimize", false);
        let validate_json = self.boolean(map, &root, "validate_json", true);
        let model = self.string(map, &root, "model", DEFAULT_MODEL_PATH);
        let input = self.required(map, &root, "input", Self::input);
        let normalize = self.nullable(map, &root, "normalize", Self::normalize);
        let returns = self.required(map, &root, "return", Self::returns);

        Some(Settings {
            grad,
            optimize,
            validate_json,
            model,
            input: input?,
            normalize: normalize?,
            returns: returns?,
        })
    }

    fn input(&mut self, value: &Value, path: &FieldPath) -> Option<InputSettings> {
        let map = self.section(value, path, INPUT_FIELDS)?;

        let name = self.string(map, path, "name", DEFAULT_DATA_FIELD);
        let validate = self.boolean(map, path, "validate", true);
        let ty = self.required(map, path, "type", |v, value, path| {
            v.keyword::<InputType>(value, path, InputType::all())
        });
        let shape = self.required(map, path, "shape", Self::shape);
        let validate_shape = self.boolean(map, path, "validate_shape", true);
        let cast = self.nullable(map, path, "cast", |v, value, path| {
            v.keyword::<CastType>(value, path, CastType::all())
        });
        let divide = self.nullable(map, path, "divide", Self::number);

        Some(InputSettings {
            name,
            validate,
            ty: ty?,
            shape: shape?,
            validate_shape,
            cast: cast?,
            divide: divide?,
        })
    }

    fn shape(&mut self, value: &Value, path: &FieldPath) -> Option<Vec<ShapeDim>> {
        let Value::Sequence(entries) = value else {
            self.report(path, Rule::Type { expected: "list" });
            return None;
        };

        let mut valid = true;
        if entries.len() < MIN_SHAPE_LEN {
            self.report(
                path,
                Rule::MinLength {
                    min: MIN_SHAPE_LEN,
                    actual: entries.len(),
                },
            );
            valid = false;
        }

        let mut dims = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let entry_path = path.index(i);
            match entry {
                Value::Number(n) => match n.as_i64() {
                    Some(dim) => dims.push(ShapeDim::Fixed(dim)),
                    None => {
                        self.report(&entry_path, Rule::Type { expected: "integer" });
                        valid = false;
                    }
                },
                Value::String(s) if s.is_empty() => {
                    self.report(&entry_path, Rule::Empty);
                    valid = false;
                }
                Value::String(s) => dims.push(ShapeDim::Field(s.clone())),
                _ => {
                    self.report(
                        &entry_path,
                        Rule::Type {
                            expected: "integer or string",
                        },
                    );
                    valid = false;
                }
            }
        }

        if !valid {
            return None;
        }
        // `reshape` infers a non-positive size, so only a positive one is a channel count.
        self.channels = match dims.get(1) {
            Some(ShapeDim::Fixed(channels)) if *channels > 0 => Channels::Fixed(*channels),
            _ => Channels::Dynamic,
        };
        Some(dims)
    }

    fn normalize(&mut self, value: &Value, path: &FieldPath) -> Option<Normalize> {
        let map = self.section(value, path, NORMALIZE_FIELDS)?;
        let means = self.required(map, path, "means", Self::constants);
        let stddevs = self.required(map, path, "stddevs", Self::constants);
        Some(Normalize {
            means: means?,
            stddevs: stddevs?,
        })
    }

    /// Per-channel constants: length 1, or the fixed channel count.
    fn constants(&mut self, value: &Value, path: &FieldPath) -> Option<Vec<f64>> {
        let Value::Sequence(entries) = value else {
            self.report(path, Rule::Type { expected: "list" });
            return None;
        };
        if entries.is_empty() {
            self.report(path, Rule::Empty);
            return None;
        }

        let mut constants = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if let Some(constant) = self.number(entry, &path.index(i)) {
                constants.push(constant);
            }
        }

        if let Channels::Fixed(channels) = self.channels {
            let length = entries.len();
            if length != 1 && i64::try_from(length).ok() != Some(channels) {
                self.report(path, Rule::NotBroadcastable { length, channels });
                return None;
            }
        }
        (constants.len() == entries.len()).then_some(constants)
    }

    fn returns(&mut self, value: &Value, path: &FieldPath) -> Option<ReturnSettings> {
        let map = self.section(value, path, RETURN_FIELDS)?;
        let output = self.nullable(map, path, "output", Self::output);
        let result = self.nullable(map, path, "result", Self::result);

        let returns = ReturnSettings {
            output: output?,
            result: result?,
        };
        if returns.is_empty() {
            tracing::warn!("configuration returns neither output nor result");
        }
        Some(returns)
    }

    fn output(&mut self, value: &Value, path: &FieldPath) -> Option<OutputSettings> {
        let map = self.section(value, path, OUTPUT_FIELDS)?;
        let name = self.string(map, path, "name", DEFAULT_OUTPUT_NAME);
        let ty = self.required(map, path, "type", |v, value, path| {
            v.keyword::<ReturnType>(value, path, ReturnType::all())
        });
        let item = self.boolean(map, path, "item", false);
        Some(OutputSettings {
            name,
            ty: ty?,
            item,
        })
    }

    fn result(&mut self, value: &Value, path: &FieldPath) -> Option<ResultSettings> {
        let map = self.section(value, path, RESULT_FIELDS)?;
        let name = self.string(map, path, "name", DEFAULT_RESULT_NAME);
        let ty = self.required(map, path, "type", |v, value, path| {
            v.keyword::<ReturnType>(value, path, ReturnType::all())
        });
        let item = self.boolean(map, path, "item", false);
        let computation = self.computation(map, path);
        Some(ResultSettings {
            name,
            ty: ty?,
            item,
            computation: computation?,
        })
    }

    fn computation(&mut self, map: &Mapping, path: &FieldPath) -> Option<Computation> {
        let operations = lookup(map, "operations");
        let code = lookup(map, "code");
        let arguments = lookup(map, "arguments");

        // An explicit `null` counts as not given; only two values exclude each other.
        match (operations, code) {
            (Field::Value(_), Field::Value(_)) => {
                self.report(
                    &path.key("code"),
                    Rule::Excludes {
                        other: "operations",
                    },
                );
                None
            }
            (Field::Missing | Field::Null, Field::Value(code)) => {
                if let Field::Value(_) = arguments {
                    self.report(&path.key("arguments"), Rule::Excludes { other: "code" });
                }
                let code = self.code(code, &path.key("code"))?;
                Some(Computation::Code { code })
            }
            (operations, Field::Missing | Field::Null) => {
                let operations_path = path.key("operations");
                let operations = self.present(operations, &operations_path, Self::operations);
                let arguments = self.arguments(
                    arguments,
                    &path.key("arguments"),
                    operations.as_ref().map(Vec::len),
                );
                Some(Computation::Chain {
                    operations: operations?,
                    arguments: arguments?,
                })
            }
        }
    }

    fn code(&mut self, value: &Value, path: &FieldPath) -> Option<String> {
        match value {
            Value::String(s) if s.trim().is_empty() => {
                self.report(path, Rule::Empty);
                None
            }
            Value::String(s) => Some(s.clone()),
            _ => {
                self.report(path, Rule::Type { expected: "string" });
                None
            }
        }
    }

    fn operations(&mut self, value: &Value, path: &FieldPath) -> Option<Vec<String>> {
        match value {
            Value::String(_) => self.operation(value, path).map(|op| vec![op]),
            Value::Sequence(entries) if entries.is_empty() => {
                self.report(path, Rule::Empty);
                None
            }
            Value::Sequence(entries) => {
                let operations: Vec<_> = entries
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| self.operation(entry, &path.index(i)))
                    .collect();
                operations.into_iter().collect()
            }
            _ => {
                self.report(
                    path,
                    Rule::Type {
                        expected: "string or list",
                    },
                );
                None
            }
        }
    }

    fn operation(&mut self, value: &Value, path: &FieldPath) -> Option<String> {
        match value {
            Value::String(s) if s.is_empty() => {
                self.report(path, Rule::Empty);
                None
            }
            Value::String(s) if !is_operation_name(s) => {
                self.report(path, Rule::InvalidOperation { name: s.clone() });
                None
            }
            Value::String(s) => Some(s.clone()),
            _ => {
                self.report(path, Rule::Type { expected: "string" });
                None
            }
        }
    }

    /// Normalizes `arguments` into a list aligned with the operations.
    ///
    /// A single scalar is the argument of the first operation.
    fn arguments(
        &mut self,
        field: Field<'_>,
        path: &FieldPath,
        operations: Option<usize>,
    ) -> Option<Option<Vec<Argument>>> {
        let value = match field {
            Field::Missing | Field::Null => return Some(None),
            Field::Value(value) => value,
        };

        match value {
            Value::Sequence(entries) => {
                if entries.is_empty() {
                    self.report(path, Rule::Empty);
                    return None;
                }
                let mut valid = true;
                if let Some(operations) = operations {
                    if entries.len() > operations {
                        self.report(
                            path,
                            Rule::TooManyArguments {
                                arguments: entries.len(),
                                operations,
                            },
                        );
                        valid = false;
                    }
                }
                let arguments: Vec<_> = entries
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| self.argument(entry, &path.index(i)))
                    .collect();
                let arguments: Option<Vec<_>> = arguments.into_iter().collect();
                if valid { arguments.map(Some) } else { None }
            }
            Value::Mapping(_) => {
                self.report(path, Rule::NestedMapping);
                None
            }
            scalar => self
                .literal(scalar, path)
                .map(|literal| Some(vec![Argument::Single(literal)])),
        }
    }

    fn argument(&mut self, value: &Value, path: &FieldPath) -> Option<Argument> {
        match value {
            Value::Null => Some(Argument::Absent),
            Value::Mapping(_) => {
                self.report(path, Rule::NestedMapping);
                None
            }
            Value::Sequence(items) => {
                let literals: Vec<_> = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let item_path = path.index(i);
                        match item {
                            Value::Sequence(_) => {
                                self.report(&item_path, Rule::NestedList);
                                None
                            }
                            Value::Mapping(_) => {
                                self.report(&item_path, Rule::NestedMapping);
                                None
                            }
                            scalar => self.literal(scalar, &item_path),
                        }
                    })
                    .collect();
                literals.into_iter().collect::<Option<_>>().map(Argument::Many)
            }
            scalar => self.literal(scalar, path).map(Argument::Single),
        }
    }

    fn literal(&mut self, value: &Value, path: &FieldPath) -> Option<Literal> {
        match value {
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Literal::Int(i))
                } else {
                    self.number(value, path).map(Literal::Float)
                }
            }
            Value::String(s) if s.is_empty() => {
                self.report(path, Rule::Empty);
                None
            }
            Value::String(s) => Some(Literal::Token(s.clone())),
            _ => {
                self.report(path, Rule::Type { expected: "scalar" });
                None
            }
        }
    }

    // -- field helpers -----------------------------------------------------

    /// Checks that `value` is a mapping and reports keys the schema lacks.
    fn section<'a>(
        &mut self,
        value: &'a Value,
        path: &FieldPath,
        known: &[&str],
    ) -> Option<&'a Mapping> {
        let Value::Mapping(map) = value else {
            self.report(path, Rule::Type { expected: "mapping" });
            return None;
        };
        for key in map.keys() {
            let name = key_name(key);
            if !known.contains(&name.as_str()) || !key.is_string() {
                self.report(&path.key(&name), Rule::Unknown);
            }
        }
        Some(map)
    }

    /// A field that must be present and non-null.
    fn required<T>(
        &mut self,
        map: &Mapping,
        path: &FieldPath,
        key: &str,
        read: impl FnOnce(&mut Self, &Value, &FieldPath) -> Option<T>,
    ) -> Option<T> {
        let path = path.key(key);
        match lookup(map, key) {
            Field::Missing => {
                self.report(&path, Rule::Required);
                None
            }
            field => self.present(field, &path, read),
        }
    }

    /// A given field that must not be null.
    fn present<T>(
        &mut self,
        field: Field<'_>,
        path: &FieldPath,
        read: impl FnOnce(&mut Self, &Value, &FieldPath) -> Option<T>,
    ) -> Option<T> {
        match field {
            Field::Missing => {
                self.report(path, Rule::Required);
                None
            }
            Field::Null => {
                self.report(path, Rule::NotNullable);
                None
            }
            Field::Value(value) => read(self, value, path),
        }
    }

    /// A field defaulting to `None`; the outer `None` signals a violation.
    fn nullable<T>(
        &mut self,
        map: &Mapping,
        path: &FieldPath,
        key: &str,
        read: impl FnOnce(&mut Self, &Value, &FieldPath) -> Option<T>,
    ) -> Option<Option<T>> {
        match lookup(map, key) {
            Field::Missing | Field::Null => Some(None),
            Field::Value(value) => read(self, value, &path.key(key)).map(Some),
        }
    }

    fn boolean(&mut self, map: &Mapping, path: &FieldPath, key: &str, default: bool) -> bool {
        let path = path.key(key);
        match lookup(map, key) {
            Field::Missing => default,
            Field::Null => {
                self.report(&path, Rule::NotNullable);
                default
            }
            Field::Value(Value::Bool(b)) => *b,
            Field::Value(_) => {
                self.report(&path, Rule::Type { expected: "boolean" });
                default
            }
        }
    }

    fn string(&mut self, map: &Mapping, path: &FieldPath, key: &str, default: &str) -> String {
        let path = path.key(key);
        match lookup(map, key) {
            Field::Missing => default.to_string(),
            Field::Null => {
                self.report(&path, Rule::NotNullable);
                default.to_string()
            }
            Field::Value(Value::String(s)) if s.is_empty() => {
                self.report(&path, Rule::Empty);
                default.to_string()
            }
            Field::Value(Value::String(s)) => s.clone(),
            Field::Value(_) => {
                self.report(&path, Rule::Type { expected: "string" });
                default.to_string()
            }
        }
    }

    fn number(&mut self, value: &Value, path: &FieldPath) -> Option<f64> {
        match value.as_f64() {
            Some(n) if n.is_finite() => Some(n),
            Some(_) => {
                self.report(path, Rule::NotFinite);
                None
            }
            None => {
                self.report(path, Rule::Type { expected: "number" });
                None
            }
        }
    }

    fn keyword<T>(&mut self, value: &Value, path: &FieldPath, all: &[T]) -> Option<T>
    where
        T: FromStr<Err = UnsupportedValueError> + Display,
    {
        let Value::String(s) = value else {
            self.report(path, Rule::Type { expected: "string" });
            return None;
        };
        match s.parse::<T>() {
            Ok(keyword) => Some(keyword),
            Err(err) => {
                self.report(
                    path,
                    Rule::Allowed {
                        value: err.value,
                        allowed: keywords(all),
                    },
                );
                None
            }
        }
    }
}
