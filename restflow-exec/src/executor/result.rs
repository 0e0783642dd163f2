use restflow_core::{
    CriteriaError, DecodeError, DocumentError, RenderError, TranslationError, WrongTemplateData,
};

use crate::executor::dispatch::DispatchError;
use crate::executor::http::HttpError;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    WrongTemplateData(#[from] WrongTemplateData),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Translation(#[from] TranslationError),
    #[error("http client error: {0}")]
    Client(HttpError),
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl ProcessError {
    /// Failures a caller may retry later: an unmet expectation, a matched unexpectation, or a
    /// status the call declared in `recoverable_codes`. Everything else is fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProcessError::Criteria(CriteriaError::Expectation { .. })
                | ProcessError::Criteria(CriteriaError::Unexpectation { .. })
                | ProcessError::Dispatch(DispatchError::RecoverableStatus { .. })
        )
    }
}
