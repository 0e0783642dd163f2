mod template;
mod variable;

pub use template::{
    display_value, parse_template, parse_template_with, render_str, Escape, Segment, Template,
    TemplateError,
};
pub use variable::{parse_var_path, Accessor, VarPath, VarPathError};

/// Validate that every `{{ ... }}` expression inside a value (keys included) is syntactically
/// valid, without resolving anything.
pub fn validate_value_expressions(value: &serde_json::Value) -> Result<(), TemplateError> {
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {
            Ok(())
        }
        serde_json::Value::String(s) => parse_template(s).map(|_| ()),
        serde_json::Value::Array(arr) => {
            for v in arr {
                validate_value_expressions(v)?;
            }
            Ok(())
        }
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                parse_template(k)?;
                validate_value_expressions(v)?;
            }
            Ok(())
        }
    }
}

/// True when any string inside the value (keys included) carries a `{{` expression.
pub fn contains_expressions(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::String(s) => s.contains("{{"),
        serde_json::Value::Array(arr) => arr.iter().any(contains_expressions),
        serde_json::Value::Object(map) => map
            .iter()
            .any(|(k, v)| k.contains("{{") || contains_expressions(v)),
        _ => false,
    }
}
