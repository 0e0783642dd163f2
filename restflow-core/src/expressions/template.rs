use std::borrow::Cow;

use serde_json::Value as JsonValue;

use super::variable::{parse_var_path, VarPath, VarPathError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Expr(VarPath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

/// How text between `{{` and `}}` and the substituted values are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// Plain text in, plain text out.
    None,
    /// The template is JSON text and every expression sits inside a JSON string literal:
    /// expression text is JSON-unescaped before parsing and values are JSON-escaped.
    JsonString,
}

impl Template {
    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    pub fn render(
        &self,
        scope: &serde_json::Map<String, JsonValue>,
        escape: Escape,
    ) -> Result<String, TemplateError> {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(l) => out.push_str(l),
                Segment::Expr(path) => {
                    let value = path.resolve(scope).ok_or_else(|| TemplateError::Undefined {
                        name: path.to_string(),
                    })?;
                    let text = display_value(value);
                    match escape {
                        Escape::None => out.push_str(&text),
                        Escape::JsonString => out.push_str(&escape_json_string(&text)),
                    }
                }
            }
        }
        Ok(out)
    }
}

pub fn parse_template(input: &str) -> Result<Template, TemplateError> {
    parse_template_with(input, Escape::None)
}

pub fn parse_template_with(input: &str, escape: Escape) -> Result<Template, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = input;

    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(Segment::Literal(rest[..open].to_string()));
        }
        let after_open = &rest[open + 2..];
        // No nesting support: the first `}}` closes the expression.
        let close = after_open
            .find("}}")
            .ok_or(TemplateError::UnclosedExpression)?;
        let raw = after_open[..close].trim();
        if raw.is_empty() {
            return Err(TemplateError::EmptyExpression);
        }
        let expr = decode_expr(raw, escape)?;
        let path = parse_var_path(&expr).map_err(|source| TemplateError::InvalidExpression {
            expr: expr.to_string(),
            source,
        })?;
        segments.push(Segment::Expr(path));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
    }

    Ok(Template { segments })
}

/// Substitute every `{{ ... }}` expression in `input` from `scope`.
///
/// A reference that does not resolve is an error; it never renders as blank.
pub fn render_str(
    input: &str,
    scope: &serde_json::Map<String, JsonValue>,
    escape: Escape,
) -> Result<String, TemplateError> {
    parse_template_with(input, escape)?.render(scope, escape)
}

pub fn display_value(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn decode_expr(raw: &str, escape: Escape) -> Result<Cow<'_, str>, TemplateError> {
    match escape {
        Escape::None => Ok(Cow::Borrowed(raw)),
        Escape::JsonString if !raw.contains('\\') => Ok(Cow::Borrowed(raw)),
        Escape::JsonString => serde_json::from_str::<String>(&format!("\"{raw}\""))
            .map(Cow::Owned)
            .map_err(|_| TemplateError::InvalidEscape(raw.to_string())),
    }
}

fn escape_json_string(s: &str) -> String {
    let quoted = JsonValue::String(s.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("'{name}' is undefined")]
    Undefined { name: String },
    #[error("unclosed template expression (missing '}}}}')")]
    UnclosedExpression,
    #[error("empty template expression")]
    EmptyExpression,
    #[error("invalid template expression '{expr}': {source}")]
    InvalidExpression {
        expr: String,
        #[source]
        source: VarPathError,
    },
    #[error("invalid escape sequence in template expression: {0}")]
    InvalidEscape(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope(v: JsonValue) -> serde_json::Map<String, JsonValue> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn splits_literals_and_expressions() {
        let t = parse_template("/api/{{ token }}/items").unwrap();
        assert_eq!(t.segments.len(), 3);
        assert!(matches!(&t.segments[1], Segment::Expr(p) if p.root == "token"));
        assert!(!t.is_literal());
        assert!(parse_template("{ \"a\": 1 }").unwrap().is_literal());
    }

    #[test]
    fn renders_scalars_and_structures() {
        let s = scope(json!({"n": 5, "b": true, "z": null, "l": [1, 2]}));
        let out = render_str("{{n}}-{{b}}-{{z}}-{{l}}", &s, Escape::None).unwrap();
        assert_eq!(out, "5-true--[1,2]");
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let err = render_str("/api/{{ token }}", &scope(json!({})), Escape::None).unwrap_err();
        assert_eq!(
            err,
            TemplateError::Undefined {
                name: "token".to_string()
            }
        );
    }

    #[test]
    fn unclosed_and_empty_expressions_fail() {
        assert_eq!(
            parse_template("a {{ b").unwrap_err(),
            TemplateError::UnclosedExpression
        );
        assert_eq!(parse_template("{{ }}").unwrap_err(), TemplateError::EmptyExpression);
    }

    #[test]
    fn json_string_mode_escapes_values_and_unescapes_expressions() {
        let s = scope(json!({"h": {"x-id": "say \"hi\""}}));
        let text = serde_json::to_string(&json!({"v": "{{ h[\"x-id\"] }}"})).unwrap();
        let out = render_str(&text, &s, Escape::JsonString).unwrap();
        let parsed: JsonValue = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!({"v": "say \"hi\""}));
    }
}
