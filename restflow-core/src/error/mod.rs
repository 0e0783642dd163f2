use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse template document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("template document has no 'rest_calls' sequence")]
    MissingRestCalls,
}

/// The template declares something the engine does not support, such as an unknown
/// `response_format` or a rule that is not a list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("wrong template data: {message}")]
pub struct WrongTemplateData {
    pub message: String,
}

impl WrongTemplateData {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("template document failed validation ({violations_len} violations)")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    violations_len: usize,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let violations_len = violations.len();
        Self {
            violations,
            violations_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
