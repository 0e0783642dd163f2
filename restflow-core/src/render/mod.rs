use thiserror::Error;

use crate::expressions::{render_str, Escape, TemplateError};
use crate::types::{AnyValue, CallSpec, ParamMap, ResultMap};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("malformed call: {0}")]
    MalformedCall(String),
}

/// Build the render scope for the next call: parameters overlaid with every result so far.
pub fn merge_scope(params: &ParamMap, results: &ResultMap) -> serde_json::Map<String, AnyValue> {
    let mut scope = params.clone();
    for (k, v) in results {
        scope.insert(k.clone(), v.clone());
    }
    scope
}

/// Render call template text (YAML or JSON) and parse the result into a call.
pub fn render(
    call_template: &str,
    scope: &serde_json::Map<String, AnyValue>,
) -> Result<CallSpec, RenderError> {
    let rendered = render_str(call_template, scope, Escape::None)?;
    let value: AnyValue = serde_yaml::from_str(&rendered)
        .map_err(|e| RenderError::MalformedCall(format!("{e} in rendered call: {rendered}")))?;
    call_from_value(value)
}

/// Render an already parsed call template.
///
/// The template is serialized to JSON text and rendered as text, so expressions may appear in
/// keys as well as values. Substituted values are escaped for the JSON string they land in.
pub fn render_call(
    call_template: &AnyValue,
    scope: &serde_json::Map<String, AnyValue>,
) -> Result<CallSpec, RenderError> {
    let text = serde_json::to_string(call_template)
        .map_err(|e| RenderError::MalformedCall(e.to_string()))?;
    let rendered = render_str(&text, scope, Escape::JsonString)?;
    let value: AnyValue = serde_json::from_str(&rendered)
        .map_err(|e| RenderError::MalformedCall(format!("{e} in rendered call: {rendered}")))?;
    call_from_value(value)
}

fn call_from_value(value: AnyValue) -> Result<CallSpec, RenderError> {
    if !value.is_object() {
        return Err(RenderError::MalformedCall(format!(
            "call must be a mapping, got: {value}"
        )));
    }
    serde_json::from_value(value).map_err(|e| RenderError::MalformedCall(e.to_string()))
}
