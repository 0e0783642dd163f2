use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));

/// One step into a nested value: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Key(String),
    Index(usize),
}

impl Accessor {
    /// Keys address sequences when they are decimal, and indices address mappings by their
    /// decimal form, so `items.0` and `codes[200]` both work.
    pub fn step<'v>(&self, value: &'v JsonValue) -> Option<&'v JsonValue> {
        match (self, value) {
            (Accessor::Key(k), JsonValue::Object(map)) => map.get(k),
            (Accessor::Key(k), JsonValue::Array(items)) => {
                k.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            (Accessor::Index(i), JsonValue::Array(items)) => items.get(*i),
            (Accessor::Index(i), JsonValue::Object(map)) => map.get(&i.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Key(k) => write!(f, "{k}"),
            Accessor::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A variable reference such as `token`, `user.id`, `items[0]` or `headers["x-id"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarPath {
    pub root: String,
    pub rest: Vec<Accessor>,
    raw: String,
}

impl VarPath {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn resolve<'v>(&self, scope: &'v serde_json::Map<String, JsonValue>) -> Option<&'v JsonValue> {
        let mut cur = scope.get(&self.root)?;
        for accessor in &self.rest {
            cur = accessor.step(cur)?;
        }
        Some(cur)
    }
}

impl fmt::Display for VarPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub fn parse_var_path(input: &str) -> Result<VarPath, VarPathError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(VarPathError::Empty);
    }

    let root_end = s
        .find(|c: char| c == '.' || c == '[')
        .unwrap_or(s.len());
    let root = s[..root_end].trim_end();
    if root.is_empty() {
        return Err(VarPathError::Empty);
    }
    if !IDENT_RE.is_match(root) {
        return Err(VarPathError::InvalidName(root.to_string()));
    }

    let mut rest = Vec::new();
    let mut tail = &s[root_end..];
    while !tail.is_empty() {
        if let Some(after) = tail.strip_prefix('.') {
            let end = after
                .find(|c: char| c == '.' || c == '[')
                .unwrap_or(after.len());
            let name = &after[..end];
            if name.is_empty() {
                return Err(VarPathError::EmptySegment);
            }
            if !SEGMENT_RE.is_match(name) {
                return Err(VarPathError::InvalidName(name.to_string()));
            }
            rest.push(Accessor::Key(name.to_string()));
            tail = &after[end..];
        } else if let Some(after) = tail.strip_prefix('[') {
            let close = after.find(']').ok_or(VarPathError::UnclosedSubscript)?;
            rest.push(parse_subscript(after[..close].trim())?);
            tail = &after[close + 1..];
        } else {
            return Err(VarPathError::UnexpectedInput(tail.to_string()));
        }
    }

    Ok(VarPath {
        root: root.to_string(),
        rest,
        raw: s.to_string(),
    })
}

fn parse_subscript(inner: &str) -> Result<Accessor, VarPathError> {
    if inner.is_empty() {
        return Err(VarPathError::EmptySegment);
    }
    for quote in ['"', '\''] {
        if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
            return Ok(Accessor::Key(inner[1..inner.len() - 1].to_string()));
        }
    }
    inner
        .parse::<usize>()
        .map(Accessor::Index)
        .map_err(|_| VarPathError::InvalidSubscript(inner.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VarPathError {
    #[error("variable reference must not be empty")]
    Empty,
    #[error("path segment must not be empty")]
    EmptySegment,
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("invalid subscript (expected an index or a quoted key): {0}")]
    InvalidSubscript(String),
    #[error("unclosed subscript (missing ']')")]
    UnclosedSubscript,
    #[error("unexpected input: {0}")]
    UnexpectedInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope(v: JsonValue) -> serde_json::Map<String, JsonValue> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn parses_dotted_and_subscripted_paths() {
        let p = parse_var_path(" user.items[1][\"x-id\"].0 ").unwrap();
        assert_eq!(p.root, "user");
        assert_eq!(
            p.rest,
            vec![
                Accessor::Key("items".to_string()),
                Accessor::Index(1),
                Accessor::Key("x-id".to_string()),
                Accessor::Key("0".to_string()),
            ]
        );
        assert_eq!(p.as_str(), "user.items[1][\"x-id\"].0");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(parse_var_path("  "), Err(VarPathError::Empty));
        assert_eq!(parse_var_path("a..b"), Err(VarPathError::EmptySegment));
        assert_eq!(parse_var_path("a[0"), Err(VarPathError::UnclosedSubscript));
        assert!(matches!(parse_var_path("1abc"), Err(VarPathError::InvalidName(_))));
        assert!(matches!(parse_var_path("a[b]"), Err(VarPathError::InvalidSubscript(_))));
        assert!(matches!(parse_var_path("a + b"), Err(VarPathError::InvalidName(_))));
    }

    #[test]
    fn resolves_against_scope() {
        let s = scope(json!({"user": {"items": [{"id": 1}, {"id": 2}]}, "codes": {"200": "ok"}}));
        let p = parse_var_path("user.items.1.id").unwrap();
        assert_eq!(p.resolve(&s), Some(&json!(2)));
        let p = parse_var_path("codes[200]").unwrap();
        assert_eq!(p.resolve(&s), Some(&json!("ok")));
        let p = parse_var_path("user.missing").unwrap();
        assert_eq!(p.resolve(&s), None);
    }
}
