//! Torchgen Domain - Core generator types
//!
//! This crate defines the settings model, the keyword type tables and the
//! validation error types. All types here are pure Rust with no I/O.

pub mod error;
pub mod settings;
pub mod types;

pub use error::{Rule, SchemaError, UnsupportedValueError, Violation};
pub use settings::{
    Argument, Computation, InputSettings, Literal, Normalize, OutputSettings, ResultSettings,
    ReturnSettings, Settings, ShapeDim,
};
pub use types::{CastType, InputType, ReturnType};
