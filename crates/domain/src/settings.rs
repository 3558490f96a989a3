//! Normalized generator settings.
//!
//! These types are produced by the validator with every default filled in.
//! Optional sections are `Option`s and keyword fields are closed enums, so
//! consumers match exhaustively instead of probing loosely typed maps.

use serde::Serialize;

use crate::types::{CastType, InputType, ReturnType};

/// Default model location inside the Lambda layer.
pub const DEFAULT_MODEL_PATH: &str = "/opt/model.ptc";
/// Default request field holding the payload.
pub const DEFAULT_DATA_FIELD: &str = "data";
/// Default response key for the raw output.
pub const DEFAULT_OUTPUT_NAME: &str = "output";
/// Default response key for the processed result.
pub const DEFAULT_RESULT_NAME: &str = "result";

/// Complete, validated generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Keep autograd enabled during inference.
    pub grad: bool,
    /// Keep the TorchScript graph executor optimizations enabled.
    pub optimize: bool,
    /// Reject requests whose body is not valid JSON.
    pub validate_json: bool,
    /// Path of the TorchScript model inside the Lambda environment.
    pub model: String,
    /// How the request payload is read.
    pub input: InputSettings,
    /// Per-channel normalization, if any.
    pub normalize: Option<Normalize>,
    /// What the handler returns.
    #[serde(rename = "return")]
    pub returns: ReturnSettings,
}

impl Settings {
    /// Serializes the settings back into a configuration document.
    ///
    /// Validating the returned document yields these same settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as YAML.
    pub fn to_document(&self) -> Result<serde_yaml::Value, serde_yaml::Error> {
        serde_yaml::to_value(self)
    }
}

/// Request payload description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSettings {
    /// Request field holding the payload.
    pub name: String,
    /// Check that the payload field exists and has the right JSON type.
    pub validate: bool,
    /// Element type of the payload.
    #[serde(rename = "type")]
    pub ty: InputType,
    /// Tensor shape, batch dimension first.
    pub shape: Vec<ShapeDim>,
    /// Check that dynamic shape fields exist and are integers.
    pub validate_shape: bool,
    /// Type the tensor is cast to after creation.
    pub cast: Option<CastType>,
    /// Value the (cast) tensor is divided by.
    pub divide: Option<f64>,
}

impl InputSettings {
    /// Returns true if every dimension is known at generation time.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.shape.iter().all(ShapeDim::is_fixed)
    }

    /// Distinct request fields providing dimensions, in declaration order.
    #[must_use]
    pub fn dynamic_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for dim in &self.shape {
            if let ShapeDim::Field(name) = dim {
                if !fields.contains(&name.as_str()) {
                    fields.push(name);
                }
            }
        }
        fields
    }
}

/// One dimension of the input shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShapeDim {
    /// Fixed size.
    Fixed(i64),
    /// Size read from this integer request field.
    Field(String),
}

impl ShapeDim {
    /// Returns true for fixed dimensions.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

/// Per-channel normalization constants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalize {
    /// Channel means.
    pub means: Vec<f64>,
    /// Channel standard deviations.
    pub stddevs: Vec<f64>,
}

/// Values returned in the JSON response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSettings {
    /// The raw network output.
    pub output: Option<OutputSettings>,
    /// A value computed from the network output.
    pub result: Option<ResultSettings>,
}

impl ReturnSettings {
    /// Returns true if neither output nor result is returned.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.output.is_none() && self.result.is_none()
    }
}

/// Raw output returned as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSettings {
    /// Response key.
    pub name: String,
    /// Type of the returned values.
    #[serde(rename = "type")]
    pub ty: ReturnType,
    /// Return a single item instead of an array.
    pub item: bool,
}

/// Result computed from the output tensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSettings {
    /// Response key.
    pub name: String,
    /// Type of the returned values.
    #[serde(rename = "type")]
    pub ty: ReturnType,
    /// Return a single item instead of an array.
    pub item: bool,
    /// How the result is computed.
    #[serde(flatten)]
    pub computation: Computation,
}

/// How the result is computed from the output tensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Computation {
    /// A chain of operations, each applied to the previous step's value.
    Chain {
        /// Operation names, applied first to last.
        operations: Vec<String>,
        /// Extra arguments aligned with `operations`.
        arguments: Option<Vec<Argument>>,
    },
    /// A C++ expression used verbatim.
    Code {
        /// The expression.
        code: String,
    },
}

/// Extra arguments of one operation in a chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Argument {
    /// No extra arguments for this step.
    Absent,
    /// A single extra argument.
    Single(Literal),
    /// Several extra arguments, in order.
    Many(Vec<Literal>),
}

impl Argument {
    /// The literals this entry contributes to its call.
    #[must_use]
    pub fn literals(&self) -> &[Literal] {
        match self {
            Self::Absent => &[],
            Self::Single(literal) => std::slice::from_ref(literal),
            Self::Many(literals) => literals,
        }
    }
}

/// A scalar argument value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    /// `true`/`false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// Source token used verbatim, e.g. `torch::kFloat`.
    Token(String),
}

impl Literal {
    /// Renders the literal as C++ source text.
    ///
    /// Floats always carry a decimal point or exponent.
    #[must_use]
    pub fn to_source(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => float_literal(*f),
            Self::Token(t) => t.clone(),
        }
    }
}

/// Renders a finite float so that C++ reads it as a floating point literal.
#[must_use]
pub fn float_literal(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(shape: Vec<ShapeDim>) -> InputSettings {
        InputSettings {
            name: DEFAULT_DATA_FIELD.to_string(),
            validate: true,
            ty: InputType::Float,
            shape,
            validate_shape: true,
            cast: None,
            divide: None,
        }
    }

    #[test]
    fn test_static_shape() {
        let fixed = input(vec![ShapeDim::Fixed(1), ShapeDim::Fixed(3)]);
        assert!(fixed.is_static());

        let dynamic = input(vec![ShapeDim::Fixed(1), ShapeDim::Field("c".into())]);
        assert!(!dynamic.is_static());
    }

    #[test]
    fn test_dynamic_fields_are_distinct_and_ordered() {
        let settings = input(vec![
            ShapeDim::Fixed(1),
            ShapeDim::Field("width".into()),
            ShapeDim::Field("height".into()),
            ShapeDim::Field("width".into()),
        ]);
        assert_eq!(settings.dynamic_fields(), vec!["width", "height"]);
    }

    #[test]
    fn test_literal_rendering() {
        assert_eq!(Literal::Int(0).to_source(), "0");
        assert_eq!(Literal::Float(255.0).to_source(), "255.0");
        assert_eq!(Literal::Float(0.5).to_source(), "0.5");
        assert_eq!(Literal::Bool(true).to_source(), "true");
        assert_eq!(Literal::Token("torch::kLong".into()).to_source(), "torch::kLong");
    }

    #[test]
    fn test_argument_literals() {
        assert!(Argument::Absent.literals().is_empty());
        assert_eq!(Argument::Single(Literal::Int(1)).literals(), &[Literal::Int(1)]);
        assert_eq!(
            Argument::Many(vec![Literal::Int(0), Literal::Int(1)]).literals().len(),
            2
        );
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = ResultSettings {
            name: DEFAULT_RESULT_NAME.to_string(),
            ty: ReturnType::Int,
            item: true,
            computation: Computation::Chain {
                operations: vec!["argmax".into()],
                arguments: None,
            },
        };
        let value = serde_yaml::to_value(&result).unwrap();
        let mapping = value.as_mapping().unwrap();
        assert_eq!(mapping.get("type").and_then(|v| v.as_str()), Some("int"));
        assert!(mapping.get("operations").unwrap().is_sequence());
        assert!(mapping.get("arguments").unwrap().is_null());
        assert!(mapping.get("code").is_none());
    }
}
