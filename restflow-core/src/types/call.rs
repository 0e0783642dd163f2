use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::WrongTemplateData;
use crate::expressions::display_value;
use crate::types::AnyValue;

/// One rendered HTTP call of a template.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CallSpec {
    pub method: String,

    /// Path part of the request URL, appended to `scheme://host:port`.
    #[serde(alias = "path")]
    pub url: String,

    #[serde(default, deserialize_with = "de_string_map")]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<AnyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_expectation: Option<AnyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_unexpectation: Option<AnyValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_translation: Option<AnyValue>,

    #[serde(default, deserialize_with = "de_status_codes")]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recoverable_codes: Vec<u16>,

    #[serde(flatten)]
    pub request: RequestOverrides,
}

/// Request properties a single call may set for itself.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_port")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "secure")]
    #[serde(deserialize_with = "de_flag")]
    pub ssl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_flag")]
    pub verify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    #[default]
    Json,
    Raw,
}

impl FromStr for PayloadFormat {
    type Err = WrongTemplateData;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(PayloadFormat::Json),
            "raw" => Ok(PayloadFormat::Raw),
            other => Err(WrongTemplateData::new(format!(
                "payload_format {other} is not supported. Only json or raw payload_format is supported"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
    Raw,
}

impl FromStr for ResponseFormat {
    type Err = WrongTemplateData;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ResponseFormat::Json),
            "xml" => Ok(ResponseFormat::Xml),
            "raw" => Ok(ResponseFormat::Raw),
            other => Err(WrongTemplateData::new(format!(
                "response_format {other} is not supported. Only json, xml or raw response_format is supported"
            ))),
        }
    }
}

impl CallSpec {
    pub fn payload_format(&self) -> Result<PayloadFormat, WrongTemplateData> {
        self.payload_format
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn response_format(&self) -> Result<ResponseFormat, WrongTemplateData> {
        self.response_format
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn is_recoverable_status(&self, status: u16) -> bool {
        self.recoverable_codes.contains(&status)
    }
}

/// Header values may be written as YAML numbers or booleans; they are sent as text.
fn de_string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, AnyValue>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, display_value(&v)))
        .collect())
}

/// Accepts `8080` as well as `"8080"`, which is what a quoted `"{{ port }}"` renders to.
pub fn lenient_port(value: &AnyValue) -> Option<i64> {
    match value {
        AnyValue::Number(n) => n.as_i64(),
        AnyValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn lenient_flag(value: &AnyValue) -> Option<bool> {
    match value {
        AnyValue::Bool(b) => Some(*b),
        AnyValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn de_port<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<AnyValue>::deserialize(deserializer)?
        .filter(|v| !v.is_null())
        .map(|v| {
            lenient_port(&v)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid port: {v}")))
        })
        .transpose()
}

fn de_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<AnyValue>::deserialize(deserializer)?
        .filter(|v| !v.is_null())
        .map(|v| {
            lenient_flag(&v)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid boolean: {v}")))
        })
        .transpose()
}

/// Rendering turns templated codes (`"{{ code }}"`) into strings, so both forms are accepted.
fn de_status_codes<'de, D>(deserializer: D) -> Result<Vec<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<AnyValue>>::deserialize(deserializer)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|v| {
            let code = match &v {
                AnyValue::Number(n) => n.as_u64(),
                AnyValue::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            code.and_then(|c| u16::try_from(c).ok()).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid status code in recoverable_codes: {v}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_minimal_call_with_defaults() {
        let call: CallSpec =
            serde_json::from_value(json!({"method": "GET", "path": "/status"})).unwrap();
        assert_eq!(call.url, "/status");
        assert!(call.headers.is_empty());
        assert_eq!(call.payload_format().unwrap(), PayloadFormat::Json);
        assert_eq!(call.response_format().unwrap(), ResponseFormat::Json);
        assert_eq!(call.request, RequestOverrides::default());
    }

    #[test]
    fn stringifies_headers_and_accepts_string_codes() {
        let call: CallSpec = serde_json::from_value(json!({
            "method": "POST",
            "url": "/x",
            "headers": {"X-Count": 5, "X-On": true},
            "recoverable_codes": [503, "429"],
            "hosts": ["a", "b"],
            "secure": true
        }))
        .unwrap();
        assert_eq!(call.headers["X-Count"], "5");
        assert_eq!(call.headers["X-On"], "true");
        assert!(call.is_recoverable_status(429));
        assert!(!call.is_recoverable_status(500));
        assert_eq!(call.request.ssl, Some(true));
        assert_eq!(call.request.port, None);
        assert_eq!(call.request.hosts.as_deref(), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[test]
    fn accepts_rendered_port_and_flags_as_strings() {
        let call: CallSpec = serde_json::from_value(json!({
            "method": "GET", "url": "/", "port": "8443", "ssl": "true", "verify": false
        }))
        .unwrap();
        assert_eq!(call.request.port, Some(8443));
        assert_eq!(call.request.ssl, Some(true));
        assert_eq!(call.request.verify, Some(false));
        assert!(serde_json::from_value::<CallSpec>(json!({
            "method": "GET", "url": "/", "port": "https"
        }))
        .is_err());
    }

    #[test]
    fn unsupported_formats_are_wrong_template_data() {
        let call: CallSpec = serde_json::from_value(json!({
            "method": "GET", "url": "/", "response_format": "yaml", "payload_format": "form"
        }))
        .unwrap();
        assert!(call.response_format().unwrap_err().to_string().contains("yaml"));
        assert!(call.payload_format().unwrap_err().to_string().contains("form"));
    }
}
