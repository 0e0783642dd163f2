mod xml;

use thiserror::Error;

use crate::types::{AnyValue, ResponseFormat};

pub use xml::xml_to_value;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("response body is not valid JSON: {0}")]
    Json(String),
    #[error("response body is not valid XML: {0}")]
    Xml(String),
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(String),
}

/// Decode a response body per the call's `response_format`.
///
/// `raw` bodies are not decoded and yield `None`: nothing is validated or extracted from them.
/// An empty JSON body decodes to null.
pub fn decode_body(format: ResponseFormat, body: &[u8]) -> Result<Option<AnyValue>, DecodeError> {
    match format {
        ResponseFormat::Raw => Ok(None),
        ResponseFormat::Json => {
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Some(AnyValue::Null));
            }
            serde_json::from_slice(body)
                .map(Some)
                .map_err(|e| DecodeError::Json(e.to_string()))
        }
        ResponseFormat::Xml => {
            let text = std::str::from_utf8(body).map_err(|e| DecodeError::Utf8(e.to_string()))?;
            xml_to_value(text).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_per_format() {
        assert_eq!(
            decode_body(ResponseFormat::Json, br#"{"a": [1, 2]}"#).unwrap(),
            Some(json!({"a": [1, 2]}))
        );
        assert_eq!(decode_body(ResponseFormat::Json, b" \n").unwrap(), Some(AnyValue::Null));
        assert_eq!(decode_body(ResponseFormat::Raw, b"<not json>").unwrap(), None);
        assert_eq!(
            decode_body(ResponseFormat::Xml, b"<r><a>1</a></r>").unwrap(),
            Some(json!({"r": {"a": "1"}}))
        );
    }

    #[test]
    fn reports_undecodable_bodies() {
        assert!(matches!(
            decode_body(ResponseFormat::Json, b"{oops"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            decode_body(ResponseFormat::Xml, &[0x3c, 0xff, 0xfe]),
            Err(DecodeError::Utf8(_))
        ));
    }
}
