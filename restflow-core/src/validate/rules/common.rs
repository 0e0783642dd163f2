use crate::expressions::{contains_expressions, validate_value_expressions};
use crate::types::AnyValue;
use crate::validate::validator::Validator;

/// Report broken `{{ }}` syntax and tell whether the value is free of expressions, i.e.
/// whether its shape can be checked before rendering.
pub(crate) fn check_expressions(v: &mut Validator, path: &str, value: &AnyValue) -> bool {
    if let Err(e) = validate_value_expressions(value) {
        v.push(path, format!("invalid template expression: {e}"));
        return false;
    }
    !contains_expressions(value)
}
