mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::TemplateDocument;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for TemplateDocument {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_document(self)
    }
}

/// Check a template document without rendering it.
///
/// Values that still carry `{{ }}` expressions are only checked for expression syntax; their
/// shape is checked again at run time once rendered.
pub fn validate_document(doc: &TemplateDocument) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_document(doc);
    v.finish()
}
