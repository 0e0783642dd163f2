//! Response expectations.
//!
//! A rule is a list of keys or indices followed by a regex, e.g. `[status, "^OK$"]` or
//! `[items, 0, state, "ready|done"]`. A list whose first element is itself a list holds
//! several rules. Patterns are anchored at the start of the value only: `"OK"` matches
//! `"OK, done"`.

use regex::Regex;
use thiserror::Error;

use crate::error::WrongTemplateData;
use crate::expressions::{display_value, Accessor};
use crate::types::AnyValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("{}", expectation_message(.path, .value, .pattern))]
    Expectation {
        path: String,
        /// `None` when the path does not exist in the response.
        value: Option<String>,
        pattern: String,
    },
    #[error("response value \"{value}\" at '{path}' matches regexp \"{pattern}\" from response_unexpectation")]
    Unexpectation {
        path: String,
        value: String,
        pattern: String,
    },
    #[error(transparent)]
    WrongTemplateData(#[from] WrongTemplateData),
}

impl CriteriaError {
    pub fn is_expectation(&self) -> bool {
        matches!(self, CriteriaError::Expectation { .. })
    }

    pub fn is_unexpectation(&self) -> bool {
        matches!(self, CriteriaError::Unexpectation { .. })
    }
}

fn expectation_message(path: &str, value: &Option<String>, pattern: &str) -> String {
    match value {
        Some(v) => format!(
            "response value \"{v}\" at '{path}' does not match regexp \"{pattern}\" from response_expectation"
        ),
        None => format!(
            "response has no value at '{path}' (expected to match regexp \"{pattern}\" from response_expectation)"
        ),
    }
}

#[derive(Debug, Clone)]
pub struct ResponseRule {
    pub path: Vec<Accessor>,
    pub pattern: String,
    regex: Regex,
}

impl ResponseRule {
    pub fn new(path: Vec<Accessor>, pattern: impl Into<String>) -> Result<Self, WrongTemplateData> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|e| {
            WrongTemplateData::new(format!("invalid regexp \"{pattern}\": {e}"))
        })?;
        Ok(Self {
            path,
            pattern,
            regex,
        })
    }

    /// Parse a single rule or a list of rules. `field` names the template field in errors.
    pub fn parse_set(value: &AnyValue, field: &str) -> Result<Vec<ResponseRule>, WrongTemplateData> {
        let AnyValue::Array(items) = value else {
            return Err(WrongTemplateData::new(format!(
                "{field} had to be list. Type {} not supported",
                type_name(value)
            )));
        };
        match items.first() {
            None => Ok(Vec::new()),
            Some(AnyValue::Array(_)) => items
                .iter()
                .map(|item| match item {
                    AnyValue::Array(rule) => Self::parse_one(rule, field),
                    other => Err(WrongTemplateData::new(format!(
                        "{field} mixes rules and non-rules: {other}"
                    ))),
                })
                .collect(),
            Some(_) => Ok(vec![Self::parse_one(items, field)?]),
        }
    }

    fn parse_one(items: &[AnyValue], field: &str) -> Result<ResponseRule, WrongTemplateData> {
        let Some((last, keys)) = items.split_last() else {
            return Err(WrongTemplateData::new(format!("{field} rule must not be empty")));
        };
        let AnyValue::String(pattern) = last else {
            return Err(WrongTemplateData::new(format!(
                "{field} rule must end with a regexp string, got: {last}"
            )));
        };
        let path = keys
            .iter()
            .map(|k| match k {
                AnyValue::String(s) => Ok(Accessor::Key(s.clone())),
                AnyValue::Number(n) => n
                    .as_u64()
                    .map(|i| Accessor::Index(i as usize))
                    .ok_or_else(|| WrongTemplateData::new(format!("{field} has invalid index {n}"))),
                other => Err(WrongTemplateData::new(format!(
                    "{field} path elements must be keys or indices, got: {other}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        ResponseRule::new(path, pattern.clone())
    }

    pub fn lookup<'v>(&self, body: &'v AnyValue) -> Option<&'v AnyValue> {
        self.path.iter().try_fold(body, |cur, accessor| accessor.step(cur))
    }

    pub fn matches(&self, value: &AnyValue) -> bool {
        self.regex.is_match(&display_value(value))
    }

    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// A missing path or a non-matching value fails the expectation.
    pub fn expect(&self, body: &AnyValue) -> Result<(), CriteriaError> {
        match self.lookup(body) {
            Some(v) if self.matches(v) => Ok(()),
            found => Err(CriteriaError::Expectation {
                path: self.path_string(),
                value: found.map(display_value),
                pattern: self.pattern.clone(),
            }),
        }
    }

    /// Only a present value that matches fails; a missing path passes.
    pub fn expect_not(&self, body: &AnyValue) -> Result<(), CriteriaError> {
        match self.lookup(body) {
            Some(v) if self.matches(v) => Err(CriteriaError::Unexpectation {
                path: self.path_string(),
                value: display_value(v),
                pattern: self.pattern.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// Check a decoded response body against the call's expectation and unexpectation rules.
///
/// Both rule sets are parsed before anything is checked, so a malformed rule is reported
/// even when an earlier rule would fail. The first failing rule aborts the check.
pub fn validate_response(
    body: &AnyValue,
    expectation: Option<&AnyValue>,
    unexpectation: Option<&AnyValue>,
) -> Result<(), CriteriaError> {
    let expected = parse_optional(expectation, "response_expectation")?;
    let unexpected = parse_optional(unexpectation, "response_unexpectation")?;
    for rule in &expected {
        rule.expect(body)?;
    }
    for rule in &unexpected {
        rule.expect_not(body)?;
    }
    Ok(())
}

fn parse_optional(value: Option<&AnyValue>, field: &str) -> Result<Vec<ResponseRule>, WrongTemplateData> {
    match value {
        None | Some(AnyValue::Null) => Ok(Vec::new()),
        Some(v) => ResponseRule::parse_set(v, field),
    }
}

fn type_name(v: &AnyValue) -> &'static str {
    match v {
        AnyValue::Null => "null",
        AnyValue::Bool(_) => "bool",
        AnyValue::Number(_) => "number",
        AnyValue::String(_) => "string",
        AnyValue::Array(_) => "list",
        AnyValue::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pattern_is_anchored_at_start_only() {
        let rule = ResponseRule::new(vec![], "OK").unwrap();
        assert!(rule.matches(&json!("OK, done")));
        assert!(!rule.matches(&json!("NOT OK")));
    }

    #[test]
    fn alternation_stays_anchored() {
        let rule = ResponseRule::new(vec![], "a|b").unwrap();
        assert!(rule.matches(&json!("b")));
        assert!(!rule.matches(&json!("cb")));
    }

    #[test]
    fn parse_set_distinguishes_single_and_multiple_rules() {
        let one = ResponseRule::parse_set(&json!(["a", 0, "^x$"]), "response_expectation").unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].path, vec![Accessor::Key("a".to_string()), Accessor::Index(0)]);
        let many =
            ResponseRule::parse_set(&json!([["a", "x"], ["b", "y"]]), "response_expectation")
                .unwrap();
        assert_eq!(many.len(), 2);
        assert!(ResponseRule::parse_set(&json!([]), "response_expectation")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn malformed_rules_are_wrong_template_data() {
        for bad in [json!("status"), json!({"a": 1}), json!(["a", 5]), json!(["a", "("])] {
            assert!(
                ResponseRule::parse_set(&bad, "response_expectation").is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn stringifies_non_string_leaves() {
        let body = json!({"count": 3, "ok": true});
        validate_response(&body, Some(&json!([["count", "^3$"], ["ok", "true"]])), None).unwrap();
    }
}
