//! Placeholder parser for `{{NAME}}` syntax
//!
//! Parses skeleton text to extract placeholder references with their positions.

use std::ops::Range;

use super::TemplateRenderError;

/// A placeholder found in the skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// The placeholder name (without `{{ }}`).
    pub name: String,

    /// Byte range in the skeleton covering the whole `{{NAME}}` marker.
    pub span: Range<usize>,
}

/// Parses the skeleton and extracts every placeholder.
///
/// Only `{{NAME}}` with a valid placeholder name counts; any other text
/// between double braces is left as source. A `{{` that is never closed is
/// an error, since the skeleton would otherwise be emitted half-filled.
///
/// # Examples
///
/// ```
/// use torchgen_application::template::parser::parse_placeholders;
///
/// let refs = parse_placeholders("const auto path = {{MODEL_PATH}};").unwrap();
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].name, "MODEL_PATH");
/// ```
///
/// # Errors
///
/// Returns [`TemplateRenderError::Unterminated`] for an unclosed `{{`.
pub fn parse_placeholders(input: &str) -> Result<Vec<PlaceholderRef>, TemplateRenderError> {
    let mut references = Vec::new();
    let mut search_from = 0;

    while let Some(offset) = input[search_from..].find("{{") {
        let start = search_from + offset;
        let body_start = start + 2;
        let Some(close) = input[body_start..].find("}}") else {
            return Err(TemplateRenderError::Unterminated { offset: start });
        };
        let body_end = body_start + close;
        let end = body_end + 2;

        let name = input[body_start..body_end].trim();
        if is_valid_placeholder_name(name) {
            references.push(PlaceholderRef {
                name: name.to_string(),
                span: start..end,
            });
            search_from = end;
        } else {
            // Not a marker; keep scanning right after the first brace.
            search_from = start + 1;
        }
    }

    Ok(references)
}

/// Validates a placeholder name.
/// Valid names: uppercase letters, digits and underscores, not starting with a digit.
#[must_use]
pub fn is_valid_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() || first == '_' => {
            chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    }
}

/// Extracts just the placeholder names, in order of appearance.
///
/// # Errors
///
/// Returns [`TemplateRenderError::Unterminated`] for an unclosed `{{`.
pub fn placeholder_names(input: &str) -> Result<Vec<String>, TemplateRenderError> {
    Ok(parse_placeholders(input)?
        .into_iter()
        .map(|r| r.name)
        .collect())
}
