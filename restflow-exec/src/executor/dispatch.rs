//! Host failover: one call is sent to the first candidate host that accepts a connection.

use std::collections::BTreeMap;
use std::fmt;

use restflow_core::{AnyValue, CallSpec, PayloadFormat, RequestProps};
use serde::Serialize;

use crate::executor::http::{HttpClient, HttpError, HttpRequestParts, HttpResponseParts};
use crate::executor::types::ExecutorConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostFailure {
    pub host: String,
    pub error: String,
}

impl fmt::Display for HostFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.host, self.error)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DispatchError {
    #[error("no hosts configured for the request")]
    NoHosts,
    #[error("could not connect to any host ({})", describe(.failures))]
    HostsExhausted { failures: Vec<HostFailure> },
    #[error("request to {url} failed with status {status}: {body}")]
    HttpStatus { status: u16, url: String, body: String },
    #[error("request to {url} returned recoverable status {status}: {body}")]
    RecoverableStatus { status: u16, url: String, body: String },
    #[error("invalid request url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: HttpError,
    },
    #[error("cannot encode payload: {0}")]
    Encode(String),
}

impl DispatchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchError::HttpStatus { status, .. }
            | DispatchError::RecoverableStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn describe(failures: &[HostFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A response with a 2xx status and the host that produced it.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub host: String,
    pub url: url::Url,
    pub response: HttpResponseParts,
    /// Hosts that were tried first and could not be reached, in order.
    pub failed_hosts: Vec<HostFailure>,
}

pub fn request_url(props: &RequestProps, host: &str, path: &str) -> Result<url::Url, DispatchError> {
    let sep = if path.starts_with('/') { "" } else { "/" };
    let raw = format!(
        "{}://{}:{}{sep}{path}",
        props.scheme(),
        host,
        props.effective_port()
    );
    url::Url::parse(&raw).map_err(|e| DispatchError::InvalidUrl {
        url: raw,
        message: e.to_string(),
    })
}

/// Encode the payload per `payload_format`. JSON bodies get a JSON content type unless the
/// call already sets one.
pub fn encode_payload(
    payload: Option<&AnyValue>,
    format: PayloadFormat,
    headers: &mut BTreeMap<String, String>,
) -> Result<Vec<u8>, DispatchError> {
    let Some(payload) = payload else {
        return Ok(Vec::new());
    };
    match format {
        PayloadFormat::Json => {
            let body =
                serde_json::to_vec(payload).map_err(|e| DispatchError::Encode(e.to_string()))?;
            if !headers
                .keys()
                .any(|k| k.eq_ignore_ascii_case("content-type"))
            {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
            }
            Ok(body)
        }
        PayloadFormat::Raw => match payload {
            AnyValue::String(s) => Ok(s.clone().into_bytes()),
            other => Ok(other.to_string().into_bytes()),
        },
    }
}

/// Send `call` to each host in `props.hosts` until one connects.
///
/// Only connection failures move on to the next host. Once a host answers, its response is
/// final: a non-2xx status is an error even if later hosts might have succeeded.
pub async fn dispatch(
    client: &dyn HttpClient,
    config: &ExecutorConfig,
    call: &CallSpec,
    payload_format: PayloadFormat,
    props: &RequestProps,
) -> Result<Dispatched, DispatchError> {
    if props.hosts.is_empty() {
        return Err(DispatchError::NoHosts);
    }

    let mut headers = call.headers.clone();
    let body = encode_payload(call.payload.as_ref(), payload_format, &mut headers)?;

    let mut failed_hosts = Vec::new();
    for host in &props.hosts {
        let url = request_url(props, host, &call.url)?;
        let req = HttpRequestParts {
            method: call.method.clone(),
            url: url.clone(),
            headers: headers.clone(),
            body: body.clone(),
            verify_tls: props.verify,
        };
        tracing::debug!(method = %call.method, %url, "sending request");

        match client
            .send(req, config.request_timeout, config.max_response_bytes)
            .await
        {
            Ok(response) => {
                tracing::debug!(%url, status = response.status, "received response");
                check_status(call, &url, &response)?;
                return Ok(Dispatched {
                    host: host.clone(),
                    url,
                    response,
                    failed_hosts,
                });
            }
            Err(HttpError::Network(error)) => {
                tracing::debug!(%host, %error, "host unreachable, trying next");
                failed_hosts.push(HostFailure {
                    host: host.clone(),
                    error,
                });
            }
            Err(source) => {
                return Err(DispatchError::Transport {
                    url: url.to_string(),
                    source,
                })
            }
        }
    }

    Err(DispatchError::HostsExhausted {
        failures: failed_hosts,
    })
}

fn check_status(call: &CallSpec, url: &url::Url, response: &HttpResponseParts) -> Result<(), DispatchError> {
    let status = response.status;
    if (200..300).contains(&status) {
        return Ok(());
    }
    let url = url.to_string();
    let body = body_preview(&response.body);
    if call.is_recoverable_status(status) {
        Err(DispatchError::RecoverableStatus { status, url, body })
    } else {
        Err(DispatchError::HttpStatus { status, url, body })
    }
}

/// Longest body excerpt carried in a status error.
const BODY_PREVIEW_CHARS: usize = 512;

fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((end, _)) => format!("{}... ({} bytes)", &text[..end], body.len()),
        None => text.into_owned(),
    }
}
