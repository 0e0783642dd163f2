use crate::criteria::ResponseRule;
use crate::translate::collect_paths;
use crate::types::{lenient_flag, lenient_port, AnyValue, PayloadFormat, ResponseFormat};
use crate::validate::rules::common::check_expressions;
use crate::validate::validator::{Validator, METHOD_RE};

const KNOWN_FIELDS: &[&str] = &[
    "method",
    "url",
    "path",
    "headers",
    "payload",
    "payload_format",
    "response_format",
    "response_expectation",
    "response_unexpectation",
    "response_translation",
    "recoverable_codes",
    "port",
    "ssl",
    "secure",
    "verify",
    "hosts",
];

pub(crate) fn validate_call(v: &mut Validator, call: &AnyValue, path: &str) {
    let AnyValue::Object(fields) = call else {
        v.push(path, "must be a mapping");
        return;
    };

    for (key, value) in fields {
        let field_path = format!("{path}.{key}");
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            v.push(field_path, "unknown field");
            continue;
        }
        if !check_expressions(v, &field_path, value) {
            continue;
        }
        match key.as_str() {
            "method" => validate_method(v, &field_path, value),
            "url" | "path" => validate_url(v, &field_path, value),
            "headers" => validate_headers(v, &field_path, value),
            "payload_format" => validate_format::<PayloadFormat>(v, &field_path, value),
            "response_format" => validate_format::<ResponseFormat>(v, &field_path, value),
            "response_expectation" | "response_unexpectation" => {
                if let Err(e) = ResponseRule::parse_set(value, key) {
                    v.push(field_path, e.message);
                }
            }
            "response_translation" => {
                if let Err(e) = collect_paths(value) {
                    v.push(field_path, e.to_string());
                }
            }
            "recoverable_codes" => validate_codes(v, &field_path, value),
            "port" => {
                if lenient_port(value).is_none() {
                    v.push(field_path, "must be an integer");
                }
            }
            "ssl" | "secure" | "verify" => {
                if lenient_flag(value).is_none() {
                    v.push(field_path, "must be a boolean");
                }
            }
            "hosts" => validate_hosts(v, &field_path, value),
            _ => {}
        }
    }

    if !fields.contains_key("method") {
        v.push(format!("{path}.method"), "is required");
    }
    if !fields.contains_key("url") && !fields.contains_key("path") {
        v.push(format!("{path}.url"), "is required");
    }
}

fn validate_method(v: &mut Validator, path: &str, value: &AnyValue) {
    match value.as_str() {
        Some(m) if METHOD_RE.is_match(m) => {}
        Some(_) => v.push(path, "must be an HTTP method name"),
        None => v.push(path, "must be a string"),
    }
}

fn validate_url(v: &mut Validator, path: &str, value: &AnyValue) {
    match value.as_str() {
        Some(u) if u.contains("://") => v.push(
            path,
            "must be a path; scheme, host and port come from the request properties",
        ),
        Some(_) => {}
        None => v.push(path, "must be a string"),
    }
}

fn validate_headers(v: &mut Validator, path: &str, value: &AnyValue) {
    let AnyValue::Object(headers) = value else {
        v.push(path, "must be a mapping");
        return;
    };
    for (name, header) in headers {
        if header.is_array() || header.is_object() {
            v.push(format!("{path}.{name}"), "must be a scalar value");
        }
    }
}

fn validate_format<F>(v: &mut Validator, path: &str, value: &AnyValue)
where
    F: std::str::FromStr<Err = crate::error::WrongTemplateData>,
{
    match value.as_str() {
        Some(s) => {
            if let Err(e) = s.parse::<F>() {
                v.push(path, e.message);
            }
        }
        None => v.push(path, "must be a string"),
    }
}

fn validate_codes(v: &mut Validator, path: &str, value: &AnyValue) {
    let AnyValue::Array(codes) = value else {
        v.push(path, "must be a list of status codes");
        return;
    };
    for (idx, code) in codes.iter().enumerate() {
        let valid = match code {
            AnyValue::Number(n) => n.as_u64().is_some_and(|c| (100..=599).contains(&c)),
            AnyValue::String(s) => s.trim().parse::<u16>().is_ok_and(|c| (100..=599).contains(&c)),
            _ => false,
        };
        if !valid {
            v.push(format!("{path}[{idx}]"), "must be an HTTP status code");
        }
    }
}

fn validate_hosts(v: &mut Validator, path: &str, value: &AnyValue) {
    let AnyValue::Array(hosts) = value else {
        v.push(path, "must be a list of host names");
        return;
    };
    for (idx, host) in hosts.iter().enumerate() {
        match host.as_str() {
            Some(h) if !h.trim().is_empty() => {}
            _ => v.push(format!("{path}[{idx}]"), "must be a non-empty host name"),
        }
    }
}
