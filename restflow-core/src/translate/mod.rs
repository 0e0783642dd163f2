//! Response translation: copy values out of a decoded response into the result map.
//!
//! A translation mirrors the response shape. Mappings select keys, lists select positions,
//! and a leaf names where the value at that position is stored:
//!
//! ```yaml
//! response_translation:
//!   auth:
//!     token: token                 # result["token"] = response["auth"]["token"]
//!     expires: [session, expires]  # result["session"]["expires"] = ...
//! ```
//!
//! When a mapping meets a list in the response, every element is translated with the same
//! mapping and the leaves collect into lists: `{id: [ids]}` against `[{id: 1}, {id: 2}]`
//! stores `{ids: [1, 2]}`. A one-key list inside a leaf path (`[servers, [all], id]`) marks
//! where that list sits when it is not the last key.

mod path;

pub use path::*;

use thiserror::Error;

use crate::types::{AnyValue, ResultMap};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    #[error("malformed response_translation at {location}: {message}")]
    MalformedTranslation { location: String, message: String },
    #[error("cannot store result at '{path}': {message}")]
    PathConflict { path: String, message: String },
}

impl TranslationError {
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        TranslationError::MalformedTranslation {
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn conflict(path: &[PathElem], message: impl Into<String>) -> Self {
        TranslationError::PathConflict {
            path: display_path(path),
            message: message.into(),
        }
    }

    fn at(self, here: &str) -> Self {
        match self {
            TranslationError::MalformedTranslation { location, message } if location.is_empty() => {
                TranslationError::MalformedTranslation {
                    location: here.to_string(),
                    message,
                }
            }
            other => other,
        }
    }
}

/// Translate `response` with `translation` and store the extracted values in `result`.
///
/// Values already in `result` under other keys are kept; a leaf overwrites what was stored
/// at its path.
pub fn extract(
    response: &AnyValue,
    translation: &AnyValue,
    result: &mut ResultMap,
) -> Result<(), TranslationError> {
    let mut translator = Translator {
        result,
        fan: Vec::new(),
    };
    translator.translate(response, translation, "$")
}

/// Every leaf path a translation can write, in document order.
pub fn collect_paths(translation: &AnyValue) -> Result<Vec<Vec<PathElem>>, TranslationError> {
    let mut out = Vec::new();
    collect_into(translation, "$", &mut out)?;
    Ok(out)
}

fn collect_into(
    mapping: &AnyValue,
    here: &str,
    out: &mut Vec<Vec<PathElem>>,
) -> Result<(), TranslationError> {
    match mapping {
        AnyValue::Null => Ok(()),
        AnyValue::Object(map) => map
            .iter()
            .try_for_each(|(k, sub)| collect_into(sub, &format!("{here}.{k}"), out)),
        AnyValue::Array(items) if is_path(items) => {
            out.push(parse_path(items).map_err(|e| e.at(here))?);
            Ok(())
        }
        AnyValue::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, sub)| collect_into(sub, &format!("{here}[{i}]"), out)),
        AnyValue::Bool(_) => Err(TranslationError::malformed(
            here,
            format!("unsupported translation value {mapping}"),
        )),
        scalar => {
            out.push(vec![PathElem::from_value(scalar).map_err(|e| e.at(here))?]);
            Ok(())
        }
    }
}

/// A list is a leaf path as soon as it holds a key; otherwise it lists sub-translations by
/// position.
pub fn is_path(items: &[AnyValue]) -> bool {
    items
        .iter()
        .any(|item| matches!(item, AnyValue::String(_) | AnyValue::Number(_)))
}

struct Translator<'r> {
    result: &'r mut ResultMap,
    /// Element indices of the list fan-outs currently being walked, outermost first.
    fan: Vec<usize>,
}

impl Translator<'_> {
    fn translate(&mut self, response: &AnyValue, mapping: &AnyValue, here: &str) -> Result<(), TranslationError> {
        match mapping {
            AnyValue::Null => Ok(()),
            AnyValue::Array(items) if is_path(items) => {
                let path = parse_path(items).map_err(|e| e.at(here))?;
                self.store(&path, response)
            }
            AnyValue::Array(items) => {
                let AnyValue::Array(values) = response else {
                    return Err(TranslationError::malformed(
                        here,
                        format!("translation is a list but the response holds {response}"),
                    ));
                };
                for (i, sub) in items.iter().enumerate() {
                    if sub.is_null() {
                        continue;
                    }
                    let at = format!("{here}[{i}]");
                    let value = values.get(i).ok_or_else(|| {
                        TranslationError::malformed(
                            at.as_str(),
                            format!("response list has only {} elements", values.len()),
                        )
                    })?;
                    self.translate(value, sub, &at)?;
                }
                Ok(())
            }
            AnyValue::Object(map) => match response {
                AnyValue::Object(values) => {
                    for (key, sub) in map {
                        let at = format!("{here}.{key}");
                        let value = values.get(key).ok_or_else(|| {
                            TranslationError::malformed(
                                at.as_str(),
                                format!("key '{key}' not found in response"),
                            )
                        })?;
                        self.translate(value, sub, &at)?;
                    }
                    Ok(())
                }
                AnyValue::Array(values) => self.fan_out(values, mapping, here),
                other => Err(TranslationError::malformed(
                    here,
                    format!("translation is a mapping but the response holds {other}"),
                )),
            },
            AnyValue::Bool(_) => Err(TranslationError::malformed(
                here,
                format!("unsupported translation value {mapping}"),
            )),
            scalar => {
                let path = vec![PathElem::from_value(scalar).map_err(|e| e.at(here))?];
                self.store(&path, response)
            }
        }
    }

    fn fan_out(&mut self, values: &[AnyValue], mapping: &AnyValue, here: &str) -> Result<(), TranslationError> {
        for path in collect_paths(mapping)? {
            let path = self.indexed(&path);
            prepare_list(self.result, &path, values.len())?;
        }
        for (i, value) in values.iter().enumerate() {
            self.fan.push(i);
            let outcome = self.translate(value, mapping, &format!("{here}[{i}]"));
            self.fan.pop();
            outcome?;
        }
        Ok(())
    }

    fn indexed(&self, path: &[PathElem]) -> Vec<PathElem> {
        self.fan
            .iter()
            .fold(path.to_vec(), |p, &i| path_for_index(&p, i))
    }

    fn store(&mut self, path: &[PathElem], value: &AnyValue) -> Result<(), TranslationError> {
        let path = self.indexed(path);
        assign(self.result, &path, value.clone())
    }
}
