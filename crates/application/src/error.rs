//! Application error types

use std::path::PathBuf;

use thiserror::Error;
use torchgen_domain::SchemaError;

use crate::ports::FileSystemError;
use crate::template::TemplateRenderError;

/// Errors aborting a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The configuration document broke the schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The configuration file is not parseable YAML.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The skeleton could not be filled.
    #[error("template error: {0}")]
    TemplateRender(#[from] TemplateRenderError),

    /// Reading or writing a file failed.
    #[error(transparent)]
    Io(#[from] FileSystemError),
}

impl GenerateError {
    /// Returns the schema violations if this is a [`SchemaError`].
    #[must_use]
    pub const fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for generation.
pub type GenerateResult<T> = Result<T, GenerateError>;
