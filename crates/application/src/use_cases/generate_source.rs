//! Generate source use case.
//!
//! Runs the whole pipeline once: load → validate/normalize → emit macros and
//! fragments → render → write. Nothing touches the destination until the
//! source text is complete.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use torchgen_domain::Settings;

use crate::error::{GenerateError, GenerateResult};
use crate::imputation::CodeImputer;
use crate::macros::MacroEmitter;
use crate::ports::FileSystem;
use crate::template::{TemplateRenderError, render};
use crate::validator::validate_and_normalize;

/// Name of the generated file inside the destination directory.
pub const SOURCE_FILE_NAME: &str = "main.cpp";

/// Where the handler skeleton comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Skeleton text already in memory.
    Text(Cow<'static, str>),
    /// Skeleton read from a file.
    File(PathBuf),
}

/// Input for generating a source file.
#[derive(Debug, Clone)]
pub struct GenerateSourceInput {
    /// Path to the YAML settings.
    pub config_path: PathBuf,
    /// Directory the source file is written into.
    pub destination_dir: PathBuf,
    /// The handler skeleton.
    pub template: TemplateSource,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct GeneratedSource {
    /// Path of the written file.
    pub path: PathBuf,
    /// The normalized settings the source was generated from.
    pub settings: Settings,
    /// Macros defined in the source.
    pub active_macros: Vec<&'static str>,
}

/// Parses the raw settings document.
///
/// # Errors
///
/// Returns [`GenerateError::Parse`] if the text is not YAML.
pub fn parse_document(path: &Path, text: &str) -> GenerateResult<Value> {
    serde_yaml::from_str(text).map_err(|e| GenerateError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Fills `template` with every fragment derived from `settings`.
///
/// # Errors
///
/// Returns a [`TemplateRenderError`] if the skeleton needs a fragment that is
/// not emitted.
pub fn create_source(settings: &Settings, template: &str) -> Result<String, TemplateRenderError> {
    let mut fragments = MacroEmitter::new(settings).fragments();
    fragments.merge(CodeImputer::new(settings).fragments());
    render(&fragments, template)
}

/// Use case for generating the handler source from settings.
pub struct GenerateSource<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> GenerateSource<F> {
    /// Creates a new `GenerateSource` use case.
    #[must_use]
    pub const fn new(fs: F) -> Self {
        Self { fs }
    }

    /// Generates the source file.
    ///
    /// # Errors
    /// - Returns error if the settings or skeleton cannot be read
    /// - Returns error if the settings are not YAML or break the schema
    /// - Returns error if the skeleton has unknown placeholders
    /// - Returns error if the file cannot be written
    pub fn execute(&self, input: GenerateSourceInput) -> GenerateResult<GeneratedSource> {
        tracing::info!(config = %input.config_path.display(), "reading settings");
        let text = self.fs.read_file_string(&input.config_path)?;
        let document = parse_document(&input.config_path, &text)?;

        tracing::info!("validating settings");
        let settings = validate_and_normalize(&document)?;

        let template = match input.template {
            TemplateSource::Text(text) => text,
            TemplateSource::File(path) => Cow::Owned(self.fs.read_file_string(&path)?),
        };

        tracing::info!("creating source from template");
        let source = create_source(&settings, &template)?;
        let path = self.write(&source, &input.destination_dir)?;

        let active_macros = MacroEmitter::new(&settings).active();
        Ok(GeneratedSource {
            path,
            settings,
            active_macros,
        })
    }

    /// Writes `source` to [`SOURCE_FILE_NAME`] in `destination_dir`,
    /// creating missing directories first.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or the file cannot be written.
    pub fn write(&self, source: &str, destination_dir: &Path) -> GenerateResult<PathBuf> {
        self.fs.create_dir_all(destination_dir)?;
        let path = destination_dir.join(SOURCE_FILE_NAME);
        self.fs.write_file_atomic(&path, source.as_bytes())?;
        tracing::info!(path = %path.display(), "wrote source");
        Ok(path)
    }
}
