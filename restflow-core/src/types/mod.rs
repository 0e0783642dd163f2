mod call;
mod common;
mod document;
mod props;

pub use call::{
    lenient_flag, lenient_port, CallSpec, PayloadFormat, RequestOverrides, ResponseFormat,
};
pub use common::{AnyValue, ParamMap, ResultMap};
pub use document::TemplateDocument;
pub use props::RequestProps;
