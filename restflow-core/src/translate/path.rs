use std::fmt;

use crate::translate::TranslationError;
use crate::types::{AnyValue, ResultMap};

/// One element of a result path.
///
/// In a translation a path is written as a list such as `[server, [ips], address]`: plain
/// scalars are keys and a one-element list marks the key whose value is a list that a
/// list-valued response fans out into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElem {
    Key(String),
    Index(usize),
    ListMarker(String),
}

impl PathElem {
    pub fn from_value(value: &AnyValue) -> Result<PathElem, TranslationError> {
        match value {
            AnyValue::String(s) => Ok(PathElem::Key(s.clone())),
            AnyValue::Number(n) => Ok(PathElem::Key(n.to_string())),
            AnyValue::Array(items) => match items.as_slice() {
                [AnyValue::String(s)] => Ok(PathElem::ListMarker(s.clone())),
                [AnyValue::Number(n)] => Ok(PathElem::ListMarker(n.to_string())),
                _ => Err(TranslationError::malformed(
                    "",
                    format!("list marker must hold exactly one key, got: {value}"),
                )),
            },
            other => Err(TranslationError::malformed(
                "",
                format!("path elements must be keys or one-key list markers, got: {other}"),
            )),
        }
    }
}

impl fmt::Display for PathElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElem::Key(k) => write!(f, "{k}"),
            PathElem::Index(i) => write!(f, "{i}"),
            PathElem::ListMarker(k) => write!(f, "[{k}]"),
        }
    }
}

pub fn display_path(path: &[PathElem]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Parse a translation list (`[a, b, c]`, `[a, [b], c]`) into a result path.
pub fn parse_path(items: &[AnyValue]) -> Result<Vec<PathElem>, TranslationError> {
    items.iter().map(PathElem::from_value).collect()
}

/// Write `value` at `path` inside `result`, creating intermediate mappings as needed.
///
/// `Index` elements address list slots; a missing slot grows the list with nulls. List
/// markers outside a fan-out behave like plain keys. The path is only borrowed.
pub fn assign(result: &mut ResultMap, path: &[PathElem], value: AnyValue) -> Result<(), TranslationError> {
    let Some((first, rest)) = path.split_first() else {
        return Err(TranslationError::conflict(path, "path is empty"));
    };
    let key = match first {
        PathElem::Key(k) | PathElem::ListMarker(k) => k.clone(),
        PathElem::Index(_) => {
            return Err(TranslationError::conflict(
                path,
                "the result map cannot be indexed",
            ))
        }
    };
    let slot = result.entry(key).or_insert(AnyValue::Null);
    assign_into(slot, rest, value, path)
}

fn assign_into(
    slot: &mut AnyValue,
    rest: &[PathElem],
    value: AnyValue,
    full: &[PathElem],
) -> Result<(), TranslationError> {
    let Some((first, rest)) = rest.split_first() else {
        *slot = value;
        return Ok(());
    };
    match first {
        PathElem::Key(k) | PathElem::ListMarker(k) => {
            if slot.is_null() {
                *slot = AnyValue::Object(serde_json::Map::new());
            }
            let AnyValue::Object(map) = slot else {
                return Err(TranslationError::conflict(
                    full,
                    format!("cannot set key '{k}' on {slot}"),
                ));
            };
            let child = map.entry(k.clone()).or_insert(AnyValue::Null);
            assign_into(child, rest, value, full)
        }
        PathElem::Index(i) => {
            if slot.is_null() {
                *slot = AnyValue::Array(Vec::new());
            }
            let AnyValue::Array(items) = slot else {
                return Err(TranslationError::conflict(
                    full,
                    format!("cannot set index {i} on {slot}"),
                ));
            };
            if items.len() <= *i {
                items.resize(*i + 1, AnyValue::Null);
            }
            assign_into(&mut items[*i], rest, value, full)
        }
    }
}

/// Address element `index` of a fan-out: the first list marker becomes a key followed by
/// the index. Without a marker the index is appended, so the whole path names the list.
///
/// `[key1, [k2], k3]` at 2 is `[key1, k2, 2, k3]`; `[key1, k2, k3]` at 1 is
/// `[key1, k2, k3, 1]`. Later markers are kept for nested fan-outs.
pub fn path_for_index(path: &[PathElem], index: usize) -> Vec<PathElem> {
    let mut out = Vec::with_capacity(path.len() + 1);
    let mut consumed = false;
    for elem in path {
        match elem {
            PathElem::ListMarker(k) if !consumed => {
                out.push(PathElem::Key(k.clone()));
                out.push(PathElem::Index(index));
                consumed = true;
            }
            other => out.push(other.clone()),
        }
    }
    if !consumed {
        out.push(PathElem::Index(index));
    }
    out
}

/// Pre-size the list a fan-out of `len` elements writes into: at the first list marker, or
/// at the end of the path when there is none. Existing content at that position is replaced.
pub fn prepare_list(result: &mut ResultMap, path: &[PathElem], len: usize) -> Result<(), TranslationError> {
    let list_path: Vec<PathElem> = match path
        .iter()
        .position(|e| matches!(e, PathElem::ListMarker(_)))
    {
        Some(pos) => path[..=pos].to_vec(),
        None => path.to_vec(),
    };
    assign(result, &list_path, AnyValue::Array(vec![AnyValue::Null; len]))
}
