//! Torchgen Infrastructure - Adapters and entry points
//!
//! This crate provides the concrete implementation of the file system port
//! defined in the application layer, the bundled handler skeleton, and the
//! `generate` operations wiring them together.

pub mod persistence;
pub mod templates;

use std::borrow::Cow;
use std::path::Path;

use torchgen_application::{
    GenerateResult, GenerateSource, GenerateSourceInput, GeneratedSource, TemplateSource,
};

pub use persistence::StdFileSystem;
pub use templates::BUNDLED_TEMPLATE;

/// Generates `main.cpp` in `destination_dir` from the settings at
/// `config_path`, using the bundled skeleton.
///
/// # Errors
///
/// Returns an error if the settings cannot be read or break the schema, or
/// if the source cannot be written. Nothing is written on error.
pub fn generate(config_path: &Path, destination_dir: &Path) -> GenerateResult<GeneratedSource> {
    run(
        config_path,
        destination_dir,
        TemplateSource::Text(Cow::Borrowed(BUNDLED_TEMPLATE)),
    )
}

/// Like [`generate`], with the skeleton read from `template_path`.
///
/// # Errors
///
/// As [`generate`]; also fails if the skeleton cannot be read or needs a
/// fragment that is never emitted.
pub fn generate_with_template(
    config_path: &Path,
    destination_dir: &Path,
    template_path: &Path,
) -> GenerateResult<GeneratedSource> {
    run(
        config_path,
        destination_dir,
        TemplateSource::File(template_path.to_path_buf()),
    )
}

fn run(
    config_path: &Path,
    destination_dir: &Path,
    template: TemplateSource,
) -> GenerateResult<GeneratedSource> {
    GenerateSource::new(StdFileSystem::new()).execute(GenerateSourceInput {
        config_path: config_path.to_path_buf(),
        destination_dir: destination_dir.to_path_buf(),
        template,
    })
}
