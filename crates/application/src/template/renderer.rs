//! Template rendering
//!
//! Substitutes every `{{NAME}}` placeholder in the skeleton with its fragment.

use super::parser::parse_placeholders;
use super::{FragmentSet, TemplateRenderError};

/// Renders `template` with `fragments`.
///
/// The skeleton is scanned once; fragment text is copied verbatim and never
/// re-scanned for placeholders. Fragments with no placeholder are ignored.
///
/// # Errors
///
/// Returns [`TemplateRenderError::MissingFragments`] naming every
/// placeholder without a fragment, or [`TemplateRenderError::Unterminated`]
/// for a malformed marker. No partial output is produced in either case.
pub fn render(fragments: &FragmentSet, template: &str) -> Result<String, TemplateRenderError> {
    let references = parse_placeholders(template)?;

    let mut missing: Vec<String> = references
        .iter()
        .filter(|r| fragments.get(&r.name).is_none())
        .map(|r| r.name.clone())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        return Err(TemplateRenderError::MissingFragments(missing));
    }

    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;
    for reference in &references {
        result.push_str(&template[last_end..reference.span.start]);
        result.push_str(fragments.get(&reference.name).unwrap_or_default());
        last_end = reference.span.end;
    }
    result.push_str(&template[last_end..]);

    tracing::debug!(
        placeholders = references.len(),
        bytes = result.len(),
        "rendered template"
    );
    Ok(result)
}
