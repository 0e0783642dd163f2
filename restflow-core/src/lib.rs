#![forbid(unsafe_code)]

pub mod criteria;
pub mod error;
pub mod expressions;
pub mod parser;
pub mod render;
pub mod response;
pub mod translate;
pub mod types;
pub mod validate;

pub use crate::criteria::{validate_response, CriteriaError, ResponseRule};
pub use crate::error::{DocumentError, ValidationError, Violation, WrongTemplateData};
pub use crate::expressions::TemplateError;
pub use crate::parser::parse_template_document;
pub use crate::render::{merge_scope, render, render_call, RenderError};
pub use crate::response::{decode_body, DecodeError};
pub use crate::translate::{extract, TranslationError};
pub use crate::types::{
    AnyValue, CallSpec, ParamMap, PayloadFormat, RequestProps, ResponseFormat, ResultMap,
    TemplateDocument,
};
pub use crate::validate::{validate_document, Validate};
