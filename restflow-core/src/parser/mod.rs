use serde::Deserialize;

use crate::error::DocumentError;
use crate::types::{AnyValue, TemplateDocument};

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    rest_calls: Option<Vec<AnyValue>>,
}

/// Parse template text (YAML, or JSON as a YAML subset) into its ordered call templates.
///
/// Blank text is an empty document. Expressions inside the calls are left untouched; a call
/// that uses an expression as a whole YAML value must quote it (`url: "{{ url }}"`).
pub fn parse_template_document(input: &str) -> Result<TemplateDocument, DocumentError> {
    if input.trim().is_empty() {
        return Ok(TemplateDocument::default());
    }
    let raw: Option<RawDocument> = serde_yaml::from_str(input)?;
    let rest_calls = raw
        .and_then(|r| r.rest_calls)
        .ok_or(DocumentError::MissingRestCalls)?;
    Ok(TemplateDocument { rest_calls })
}
