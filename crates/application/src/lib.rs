//! Torchgen Application - Generator pipeline and ports
//!
//! This crate defines the application layer with:
//! - Schema validation and normalization of settings documents
//! - Macro and code fragment emission
//! - Skeleton rendering
//! - Port traits and the generate use case

pub mod error;
pub mod imputation;
pub mod macros;
pub mod ports;
pub mod template;
pub mod use_cases;
pub mod validator;

pub use error::{GenerateError, GenerateResult};
pub use imputation::CodeImputer;
pub use macros::{Macro, MacroEmitter};
pub use ports::{FileSystem, FileSystemError};
pub use template::{FragmentSet, TemplateRenderError, render};
pub use use_cases::{
    GenerateSource, GenerateSourceInput, GeneratedSource, SOURCE_FILE_NAME, TemplateSource,
    create_source,
};
pub use validator::{SettingsValidator, validate_and_normalize};
