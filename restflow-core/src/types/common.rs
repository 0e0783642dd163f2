pub type AnyValue = serde_json::Value;

/// Caller-supplied template parameters.
pub type ParamMap = serde_json::Map<String, AnyValue>;

/// Values extracted from responses, accumulated across one sequence run.
pub type ResultMap = serde_json::Map<String, AnyValue>;
