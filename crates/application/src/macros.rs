//! Feature toggles emitted as `#define` directives.
//!
//! Every rule reads the normalized settings on its own; no rule depends on
//! another one having been evaluated.

use torchgen_domain::settings::float_literal;
use torchgen_domain::{InputType, Settings};

use crate::template::FragmentSet;

/// Returns `#define NAME` or `#define NAME VALUE`.
#[must_use]
pub fn define(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("#define {name} {value}"),
        None => format!("#define {name}"),
    }
}

/// Returns the directive if `condition` holds, otherwise an empty string.
///
/// ```
/// use torchgen_application::macros::emit;
///
/// assert_eq!(emit("GRAD", true, None), "#define GRAD");
/// assert_eq!(emit("DIVIDE", true, Some("255.0")), "#define DIVIDE 255.0");
/// assert_eq!(emit("GRAD", false, None), "");
/// ```
#[must_use]
pub fn emit(name: &str, condition: bool, value: Option<&str>) -> String {
    if condition {
        define(name, value)
    } else {
        String::new()
    }
}

/// Toggles understood by the handler skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Macro {
    /// Every shape dimension is fixed.
    Static,
    /// Autograd stays enabled.
    Grad,
    /// Graph executor optimizations stay enabled.
    Optimize,
    /// Reject request bodies that are not JSON.
    ValidateJson,
    /// The payload is a base64 string.
    Base64,
    /// Check the payload field exists and has the right JSON type.
    ValidateField,
    /// Check the dynamic shape fields.
    ValidateShape,
    /// Normalize the input per channel.
    Normalize,
    /// Cast the input tensor, valued with the target dtype.
    Cast,
    /// Divide the input tensor, valued with the divisor.
    Divide,
    /// Return the output as an array.
    ReturnOutput,
    /// Return the output as a single item.
    ReturnOutputItem,
    /// Return the result as an array.
    ReturnResult,
    /// Return the result as a single item.
    ReturnResultItem,
}

impl Macro {
    /// Get all macros, in the order they appear in the skeleton.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Static,
            Self::Grad,
            Self::Optimize,
            Self::ValidateJson,
            Self::Base64,
            Self::ValidateField,
            Self::ValidateShape,
            Self::Normalize,
            Self::Cast,
            Self::Divide,
            Self::ReturnOutput,
            Self::ReturnOutputItem,
            Self::ReturnResult,
            Self::ReturnResultItem,
        ]
    }

    /// The macro name, also the name of its placeholder.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::Grad => "GRAD",
            Self::Optimize => "OPTIMIZE",
            Self::ValidateJson => "VALIDATE_JSON",
            Self::Base64 => "BASE64",
            Self::ValidateField => "VALIDATE_FIELD",
            Self::ValidateShape => "VALIDATE_SHAPE",
            Self::Normalize => "NORMALIZE",
            Self::Cast => "CAST",
            Self::Divide => "DIVIDE",
            Self::ReturnOutput => "RETURN_OUTPUT",
            Self::ReturnOutputItem => "RETURN_OUTPUT_ITEM",
            Self::ReturnResult => "RETURN_RESULT",
            Self::ReturnResultItem => "RETURN_RESULT_ITEM",
        }
    }
}

/// Derives macro directives from settings.
pub struct MacroEmitter<'a> {
    settings: &'a Settings,
}

impl<'a> MacroEmitter<'a> {
    /// Create a new emitter for the given settings.
    #[must_use]
    pub const fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Returns true if the macro should be defined.
    #[must_use]
    pub fn is_active(&self, m: Macro) -> bool {
        let settings = self.settings;
        let output = settings.returns.output.as_ref();
        let result = settings.returns.result.as_ref();
        match m {
            Macro::Static => settings.input.is_static(),
            Macro::Grad => settings.grad,
            Macro::Optimize => settings.optimize,
            Macro::ValidateJson => settings.validate_json,
            Macro::Base64 => settings.input.ty == InputType::Base64,
            Macro::ValidateField => settings.input.validate,
            Macro::ValidateShape => settings.input.validate_shape,
            Macro::Normalize => settings.normalize.is_some(),
            Macro::Cast => settings.input.cast.is_some(),
            Macro::Divide => settings.input.divide.is_some(),
            Macro::ReturnOutput => output.is_some_and(|o| !o.item),
            Macro::ReturnOutputItem => output.is_some_and(|o| o.item),
            Macro::ReturnResult => result.is_some_and(|r| !r.item),
            Macro::ReturnResultItem => result.is_some_and(|r| r.item),
        }
    }

    /// Value of a valued macro.
    #[must_use]
    pub fn value(&self, m: Macro) -> Option<String> {
        match m {
            Macro::Cast => self
                .settings
                .input
                .cast
                .map(|cast| cast.torch_dtype().to_string()),
            Macro::Divide => self.settings.input.divide.map(float_literal),
            _ => None,
        }
    }

    /// Renders one macro, empty if inactive.
    #[must_use]
    pub fn render(&self, m: Macro) -> String {
        emit(m.name(), self.is_active(m), self.value(m).as_deref())
    }

    /// Names of the macros that will be defined.
    #[must_use]
    pub fn active(&self) -> Vec<&'static str> {
        Macro::all()
            .iter()
            .filter(|m| self.is_active(**m))
            .map(|m| m.name())
            .collect()
    }

    /// One fragment per macro, keyed by macro name.
    #[must_use]
    pub fn fragments(&self) -> FragmentSet {
        let mut fragments = FragmentSet::new();
        for m in Macro::all() {
            fragments.insert(m.name(), self.render(*m));
        }
        tracing::debug!(active = ?self.active(), "emitted macros");
        fragments
    }
}
