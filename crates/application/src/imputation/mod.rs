//! Literal source fragments derived from settings.
//!
//! [`CodeImputer`] computes every fragment that is substituted directly into
//! the handler skeleton: field names, the shape expression, type and
//! accessor identifiers, normalization constants and the result expression.

pub mod expression;

use torchgen_domain::settings::float_literal;
use torchgen_domain::{ReturnType, Settings, ShapeDim};

use crate::template::FragmentSet;

pub use expression::{Expr, OUTPUT_SYMBOL, fold_chain, result_expression};

/// Variable holding the parsed request in the handler skeleton.
pub const JSON_VIEW: &str = "json_view";

/// Quotes `value` as a C++ string literal.
#[must_use]
pub fn cpp_string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\t' => literal.push_str("\\t"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

/// Derives imputed fragments from settings.
pub struct CodeImputer<'a> {
    settings: &'a Settings,
}

impl<'a> CodeImputer<'a> {
    /// Create a new imputer for the given settings.
    #[must_use]
    pub const fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Quoted name of the request field holding the payload.
    #[must_use]
    pub fn data(&self) -> String {
        cpp_string_literal(&self.settings.input.name)
    }

    /// Distinct request fields providing dimensions.
    #[must_use]
    pub fn dynamic_fields(&self) -> Vec<&'a str> {
        self.settings.input.dynamic_fields()
    }

    /// Quoted dynamic fields, comma separated.
    #[must_use]
    pub fn fields(&self) -> String {
        self.dynamic_fields()
            .into_iter()
            .map(cpp_string_literal)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Arguments of `reshape`, one per dimension in declared order.
    #[must_use]
    pub fn inputs(&self) -> String {
        self.settings
            .input
            .shape
            .iter()
            .map(|dim| match dim {
                ShapeDim::Fixed(size) => size.to_string(),
                ShapeDim::Field(name) => {
                    format!("{JSON_VIEW}.GetInteger({})", cpp_string_literal(name))
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Normalization means, empty without normalization.
    #[must_use]
    pub fn normalize_means(&self) -> String {
        self.settings
            .normalize
            .as_ref()
            .map(|n| join_floats(&n.means))
            .unwrap_or_default()
    }

    /// Normalization standard deviations, empty without normalization.
    #[must_use]
    pub fn normalize_stddevs(&self) -> String {
        self.settings
            .normalize
            .as_ref()
            .map(|n| join_floats(&n.stddevs))
            .unwrap_or_default()
    }

    /// Expression computing the result from the output tensor.
    #[must_use]
    pub fn result_expression(&self) -> String {
        result_expression(self.settings.returns.result.as_ref())
    }

    /// Quoted model path.
    #[must_use]
    pub fn model_path(&self) -> String {
        cpp_string_literal(&self.settings.model)
    }

    /// Every imputed fragment, keyed by placeholder name.
    #[must_use]
    pub fn fragments(&self) -> FragmentSet {
        let input = &self.settings.input;
        let returns = &self.settings.returns;

        let mut fragments = FragmentSet::new();
        fragments.insert("DATA", self.data());
        fragments.insert("FIELDS", self.fields());
        fragments.insert("DATA_TYPE", input.ty.cpp_type());
        fragments.insert("DATA_FUNC", input.ty.json_accessor());
        fragments.insert("TORCH_DATA_TYPE", input.ty.torch_dtype());
        fragments.insert("INPUTS", self.inputs());
        fragments.insert("NORMALIZE_MEANS", self.normalize_means());
        fragments.insert("NORMALIZE_STDDEVS", self.normalize_stddevs());
        insert_return(
            &mut fragments,
            "OUTPUT",
            returns.output.as_ref().map(|o| (o.name.as_str(), o.ty)),
        );
        insert_return(
            &mut fragments,
            "RESULT",
            returns.result.as_ref().map(|r| (r.name.as_str(), r.ty)),
        );
        fragments.insert("RESULT_EXPRESSION", self.result_expression());
        fragments.insert("MODEL_PATH", self.model_path());

        tracing::debug!(fields = ?self.dynamic_fields(), "imputed fragments");
        fragments
    }
}

/// Fragments describing one returned value; all empty when it is absent.
fn insert_return(fragments: &mut FragmentSet, prefix: &str, declared: Option<(&str, ReturnType)>) {
    let (name, array_function, item_function, ty, torch_type, cast) = match declared {
        Some((name, ty)) => (
            cpp_string_literal(name),
            ty.json_function(true),
            ty.json_function(false),
            ty.keyword(),
            ty.storage_type(),
            ty.torch_dtype(),
        ),
        None => (String::new(), "", "", "", "", ""),
    };
    fragments.insert(format!("{prefix}_NAME"), name);
    fragments.insert(format!("{prefix}_ARRAY_FUNCTION"), array_function);
    fragments.insert(format!("{prefix}_ITEM_FUNCTION"), item_function);
    fragments.insert(format!("{prefix}_TYPE"), ty);
    fragments.insert(format!("{prefix}_TORCH_TYPE"), torch_type);
    fragments.insert(format!("{prefix}_CAST"), cast);
}

fn join_floats(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| float_literal(*v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_and_normalize;
    use pretty_assertions::assert_eq;

    fn settings(yaml: &str) -> Settings {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        validate_and_normalize(&document).unwrap()
    }

    #[test]
    fn test_string_literal_escaping() {
        assert_eq!(cpp_string_literal("data"), "\"data\"");
        assert_eq!(cpp_string_literal("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_dynamic_shape() {
        let settings = settings(
            r#"
input:
  name: image
  type: byte
  shape: [1, 3, "width", "height"]
return:
  output:
    type: double
"#,
        );
        let imputer = CodeImputer::new(&settings);
        assert_eq!(imputer.data(), "\"image\"");
        assert_eq!(imputer.dynamic_fields(), vec!["width", "height"]);
        assert_eq!(imputer.fields(), "\"width\", \"height\"");
        assert_eq!(
            imputer.inputs(),
            "1, 3, json_view.GetInteger(\"width\"), json_view.GetInteger(\"height\")"
        );
    }

    #[test]
    fn test_static_shape_has_no_fields() {
        let settings = settings(
            r"
input:
  type: float
  shape: [1, 784]
return:
  output:
    type: double
",
        );
        let imputer = CodeImputer::new(&settings);
        assert_eq!(imputer.fields(), "");
        assert_eq!(imputer.inputs(), "1, 784");
    }

    #[test]
    fn test_normalize_constants() {
        let settings = settings(
            r"
input:
  type: base64
  shape: [1, 3, 224, 224]
normalize:
  means: [0.485, 0.456, 0.406]
  stddevs: [0.229, 0.224, 0.225]
return:
  output:
    type: double
",
        );
        let imputer = CodeImputer::new(&settings);
        assert_eq!(imputer.normalize_means(), "0.485, 0.456, 0.406");
        assert_eq!(imputer.normalize_stddevs(), "0.229, 0.224, 0.225");
    }

    #[test]
    fn test_without_normalize_constants_are_empty() {
        let settings = settings(
            r"
input:
  type: float
  shape: [1, 3]
return:
  output:
    type: double
",
        );
        assert_eq!(CodeImputer::new(&settings).normalize_means(), "");
    }

    #[test]
    fn test_return_fragments() {
        let settings = settings(
            r"
input:
  type: long
  shape: [1, 16]
return:
  output:
    name: logits
    type: double
  result:
    type: bool
    item: true
    operations: [sigmoid, any]
",
        );
        let fragments = CodeImputer::new(&settings).fragments();
        assert_eq!(fragments.get("DATA_TYPE"), Some("int64_t"));
        assert_eq!(fragments.get("DATA_FUNC"), Some("AsInt64"));
        assert_eq!(fragments.get("TORCH_DATA_TYPE"), Some("torch::kInt64"));
        assert_eq!(fragments.get("OUTPUT_NAME"), Some("\"logits\""));
        assert_eq!(fragments.get("OUTPUT_ARRAY_FUNCTION"), Some("AsDouble"));
        assert_eq!(fragments.get("OUTPUT_CAST"), Some("torch::kFloat64"));
        assert_eq!(fragments.get("RESULT_NAME"), Some("\"result\""));
        assert_eq!(fragments.get("RESULT_ITEM_FUNCTION"), Some("WithBool"));
        assert_eq!(fragments.get("RESULT_TORCH_TYPE"), Some("int8_t"));
        assert_eq!(fragments.get("RESULT_TYPE"), Some("bool"));
        assert_eq!(fragments.get("RESULT_EXPRESSION"), Some("any(sigmoid(output))"));
        assert_eq!(fragments.get("MODEL_PATH"), Some("\"/opt/model.ptc\""));
    }

    #[test]
    fn test_absent_return_fragments_are_empty() {
        let settings = settings(
            r"
input:
  type: float
  shape: [1, 16]
return:
  result:
    type: int
    operations: argmax
",
        );
        let fragments = CodeImputer::new(&settings).fragments();
        for name in [
            "OUTPUT_NAME",
            "OUTPUT_ARRAY_FUNCTION",
            "OUTPUT_ITEM_FUNCTION",
            "OUTPUT_TYPE",
            "OUTPUT_TORCH_TYPE",
            "OUTPUT_CAST",
        ] {
            assert_eq!(fragments.get(name), Some(""), "{name}");
        }
    }
}
