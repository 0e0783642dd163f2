use crate::types::AnyValue;

/// A parsed template document.
///
/// Calls stay unrendered values here; each one is rendered right before it runs so it can
/// see the results of the calls before it.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemplateDocument {
    pub rest_calls: Vec<AnyValue>,
}
