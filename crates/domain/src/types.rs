//! Type tables mapping configuration keywords to C++ identifiers.
//!
//! Each supported keyword is a variant of a closed enum, so every lookup is
//! an exhaustive `match`. Keyword strings only enter through [`FromStr`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::UnsupportedValueError;

/// Element type of the payload carried in the request's data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Base64 encoded bytes in a single string field.
    Base64,
    /// Unsigned 8-bit integers.
    Byte,
    /// Signed 8-bit integers.
    Char,
    /// Signed 16-bit integers.
    Short,
    /// Signed 32-bit integers.
    Int,
    /// Signed 64-bit integers.
    Long,
    /// 32-bit floats.
    Float,
    /// 64-bit floats.
    Double,
}

impl InputType {
    /// Table name used in lookup errors.
    pub const TABLE: &'static str = "input type";

    /// Get all input types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Base64,
            Self::Byte,
            Self::Char,
            Self::Short,
            Self::Int,
            Self::Long,
            Self::Float,
            Self::Double,
        ]
    }

    /// The configuration keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// C++ type elements are collected into before building the tensor.
    ///
    /// Base64 payloads are decoded straight into bytes, so they have none.
    #[must_use]
    pub const fn cpp_type(self) -> &'static str {
        match self {
            Self::Base64 => "",
            Self::Byte => "uint8_t",
            Self::Char => "int8_t",
            Self::Short => "int16_t",
            Self::Int => "int32_t",
            Self::Long => "int64_t",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// `JsonView` accessor reading one array element.
    #[must_use]
    pub const fn json_accessor(self) -> &'static str {
        match self {
            Self::Base64 => "",
            Self::Byte | Self::Char | Self::Short | Self::Int => "AsInteger",
            Self::Long => "AsInt64",
            Self::Float | Self::Double => "AsDouble",
        }
    }

    /// Torch dtype of the tensor created from the payload.
    #[must_use]
    pub const fn torch_dtype(self) -> &'static str {
        match self {
            Self::Base64 | Self::Byte => "torch::kUInt8",
            Self::Char => "torch::kInt8",
            Self::Short => "torch::kInt16",
            Self::Int => "torch::kInt32",
            Self::Long => "torch::kInt64",
            Self::Float => "torch::kFloat32",
            Self::Double => "torch::kFloat64",
        }
    }
}

/// Type the input tensor is cast to after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CastType {
    /// `torch::kUInt8`
    Byte,
    /// `torch::kInt8`
    Char,
    /// `torch::kInt16`
    Short,
    /// `torch::kInt32`
    Int,
    /// `torch::kInt64`
    Long,
    /// `torch::kFloat16`
    Half,
    /// `torch::kFloat32`
    Float,
    /// `torch::kFloat64`
    Double,
}

impl CastType {
    /// Table name used in lookup errors.
    pub const TABLE: &'static str = "cast type";

    /// Get all cast types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Byte,
            Self::Char,
            Self::Short,
            Self::Int,
            Self::Long,
            Self::Half,
            Self::Float,
            Self::Double,
        ]
    }

    /// The configuration keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Half => "half",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Torch dtype the tensor is converted to.
    #[must_use]
    pub const fn torch_dtype(self) -> &'static str {
        match self {
            Self::Byte => "torch::kUInt8",
            Self::Char => "torch::kInt8",
            Self::Short => "torch::kInt16",
            Self::Int => "torch::kInt32",
            Self::Long => "torch::kInt64",
            Self::Half => "torch::kFloat16",
            Self::Float => "torch::kFloat32",
            Self::Double => "torch::kFloat64",
        }
    }
}

/// Type of the values placed in the JSON response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Long,
    /// 64-bit float.
    Double,
    /// Boolean, stored as `int8_t` in the tensor.
    Bool,
}

impl ReturnType {
    /// Table name used in lookup errors.
    pub const TABLE: &'static str = "return type";

    /// Get all return types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Int, Self::Long, Self::Double, Self::Bool]
    }

    /// The configuration keyword, also the C++ type values are cast to.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Bool => "bool",
        }
    }

    /// Torch dtype the tensor is converted to before reading values.
    #[must_use]
    pub const fn torch_dtype(self) -> &'static str {
        match self {
            Self::Int => "torch::kInt32",
            Self::Long => "torch::kInt64",
            Self::Double => "torch::kFloat64",
            Self::Bool => "torch::kInt8",
        }
    }

    /// C++ type matching [`Self::torch_dtype`], used for `data_ptr<T>()`.
    ///
    /// libtorch has no bool accessor here, so booleans go through `int8_t`.
    #[must_use]
    pub const fn storage_type(self) -> &'static str {
        match self {
            Self::Int => "int32_t",
            Self::Long => "int64_t",
            Self::Double => "double",
            Self::Bool => "int8_t",
        }
    }

    /// `JsonValue` function inserting values of this type.
    ///
    /// Arrays are built element-wise with `As*`, single items with `With*`.
    #[must_use]
    pub const fn json_function(self, array: bool) -> &'static str {
        match (self, array) {
            (Self::Int, true) => "AsInteger",
            (Self::Int, false) => "WithInteger",
            (Self::Long, true) => "AsInt64",
            (Self::Long, false) => "WithInt64",
            (Self::Double, true) => "AsDouble",
            (Self::Double, false) => "WithDouble",
            (Self::Bool, true) => "AsBool",
            (Self::Bool, false) => "WithBool",
        }
    }
}

macro_rules! keyword_table {
    ($ty:ident) => {
        impl FromStr for $ty {
            type Err = UnsupportedValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::all()
                    .iter()
                    .copied()
                    .find(|t| t.keyword() == s)
                    .ok_or_else(|| UnsupportedValueError::new(Self::TABLE, s))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        }
    };
}

keyword_table!(InputType);
keyword_table!(CastType);
keyword_table!(ReturnType);

/// Keywords accepted by a table, in declaration order.
#[must_use]
pub fn keywords<T, I>(all: I) -> Vec<String>
where
    T: fmt::Display,
    I: IntoIterator<Item = T>,
{
    all.into_iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_every_keyword() {
        for ty in InputType::all() {
            assert_eq!(ty.keyword().parse::<InputType>(), Ok(*ty));
        }
        for ty in CastType::all() {
            assert_eq!(ty.keyword().parse::<CastType>(), Ok(*ty));
        }
        for ty in ReturnType::all() {
            assert_eq!(ty.keyword().parse::<ReturnType>(), Ok(*ty));
        }
    }

    #[test]
    fn test_unknown_keyword_is_unsupported() {
        let err = "half".parse::<InputType>().unwrap_err();
        assert_eq!(err.table, InputType::TABLE);
        assert_eq!(err.value, "half");

        assert!("base64".parse::<CastType>().is_err());
        assert!("float".parse::<ReturnType>().is_err());
    }

    #[test]
    fn test_input_tables() {
        assert_eq!(InputType::Float.cpp_type(), "float");
        assert_eq!(InputType::Float.json_accessor(), "AsDouble");
        assert_eq!(InputType::Long.json_accessor(), "AsInt64");
        assert_eq!(InputType::Short.torch_dtype(), "torch::kInt16");
        assert_eq!(InputType::Base64.cpp_type(), "");
        assert_eq!(InputType::Base64.torch_dtype(), "torch::kUInt8");
    }

    #[test]
    fn test_return_tables() {
        assert_eq!(ReturnType::Bool.torch_dtype(), "torch::kInt8");
        assert_eq!(ReturnType::Bool.storage_type(), "int8_t");
        assert_eq!(ReturnType::Bool.json_function(false), "WithBool");
        assert_eq!(ReturnType::Long.json_function(true), "AsInt64");
        assert_eq!(ReturnType::Int.json_function(false), "WithInteger");
    }

    #[test]
    fn test_cast_half() {
        assert_eq!(CastType::Half.torch_dtype(), "torch::kFloat16");
        assert_eq!(CastType::Half.to_string(), "half");
    }

    #[test]
    fn test_keywords_listing() {
        assert_eq!(
            keywords(ReturnType::all().iter()),
            vec!["int", "long", "double", "bool"]
        );
    }
}
