//! Failure reports written to stderr.

use serde_json::json;
use torchgen_application::GenerateError;

use crate::config::ReportFormat;

/// Renders `err` for the user.
///
/// Schema errors list one violation per line in text form, or as an array
/// of `{path, rule, ...}` objects in JSON form.
#[must_use]
pub fn render_error(err: &GenerateError, format: ReportFormat) -> String {
    match (format, err.as_schema()) {
        (ReportFormat::Text, Some(schema)) => schema
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        (ReportFormat::Text, None) => format!("error: {err}"),
        (ReportFormat::Json, Some(schema)) => {
            json!({ "error": "schema", "violations": schema.violations }).to_string()
        }
        (ReportFormat::Json, None) => json!({ "error": err.to_string() }).to_string(),
    }
}
