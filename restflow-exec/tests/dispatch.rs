use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use restflow_core::{CallSpec, PayloadFormat, RequestProps};
use restflow_exec::executor::{
    dispatch, DispatchError, ExecutorConfig, HttpClient, HttpError, HttpRequestParts,
    HttpResponseParts,
};
use serde_json::json;

/// Answers per host; hosts without an entry refuse the connection.
#[derive(Default)]
struct ScriptedClient {
    answers: BTreeMap<String, Result<u16, HttpError>>,
    seen: Mutex<Vec<HttpRequestParts>>,
}

impl ScriptedClient {
    fn answer(mut self, host: &str, outcome: Result<u16, HttpError>) -> Self {
        self.answers.insert(host.to_string(), outcome);
        self
    }

    fn urls(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        _timeout: Duration,
        _max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        let host = req.url.host_str().unwrap_or_default().to_string();
        self.seen.lock().unwrap().push(req);
        match self.answers.get(&host) {
            Some(Ok(status)) => Ok(HttpResponseParts {
                status: *status,
                headers: BTreeMap::new(),
                body: format!("from {host}").into_bytes(),
            }),
            Some(Err(e)) => Err(e.clone()),
            None => Err(HttpError::Network(format!("connection refused: {host}"))),
        }
    }
}

fn call(value: serde_json::Value) -> CallSpec {
    serde_json::from_value(value).unwrap()
}

fn props(hosts: &[&str]) -> RequestProps {
    RequestProps {
        hosts: hosts.iter().map(|h| h.to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn fails_over_to_next_host() {
    let client = ScriptedClient::default().answer("h2", Ok(200));
    let out = dispatch(
        &client,
        &ExecutorConfig::default(),
        &call(json!({"method": "GET", "url": "/status"})),
        PayloadFormat::Json,
        &props(&["h1", "h2", "h3"]),
    )
    .await
    .unwrap();

    assert_eq!(out.host, "h2");
    assert_eq!(out.response.body, b"from h2");
    assert_eq!(out.failed_hosts.len(), 1);
    assert_eq!(out.failed_hosts[0].host, "h1");
    assert_eq!(client.urls(), vec!["http://h1/status", "http://h2/status"]);
}

#[tokio::test]
async fn stops_at_first_host_that_answers_even_with_error_status() {
    let client = ScriptedClient::default()
        .answer("h1", Ok(500))
        .answer("h2", Ok(200));
    let err = dispatch(
        &client,
        &ExecutorConfig::default(),
        &call(json!({"method": "GET", "url": "/"})),
        PayloadFormat::Json,
        &props(&["h1", "h2"]),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DispatchError::HttpStatus { status: 500, .. }));
    assert_eq!(client.urls().len(), 1);
}

#[tokio::test]
async fn declared_codes_are_recoverable() {
    let client = ScriptedClient::default().answer("h1", Ok(503));
    let err = dispatch(
        &client,
        &ExecutorConfig::default(),
        &call(json!({"method": "GET", "url": "/", "recoverable_codes": [429, 503]})),
        PayloadFormat::Json,
        &props(&["h1"]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DispatchError::RecoverableStatus { status: 503, .. }));
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn reports_every_host_when_none_connects() {
    let client = ScriptedClient::default();
    let err = dispatch(
        &client,
        &ExecutorConfig::default(),
        &call(json!({"method": "GET", "url": "/"})),
        PayloadFormat::Json,
        &props(&["h1", "h2"]),
    )
    .await
    .unwrap_err();

    let DispatchError::HostsExhausted { failures } = &err else {
        panic!("expected HostsExhausted, got {err}");
    };
    let hosts: Vec<&str> = failures.iter().map(|f| f.host.as_str()).collect();
    assert_eq!(hosts, vec!["h1", "h2"]);
    assert!(err.to_string().contains("connection refused: h2"));
}

#[tokio::test]
async fn timeouts_do_not_fail_over() {
    let client = ScriptedClient::default()
        .answer("h1", Err(HttpError::Timeout))
        .answer("h2", Ok(200));
    let err = dispatch(
        &client,
        &ExecutorConfig::default(),
        &call(json!({"method": "GET", "url": "/"})),
        PayloadFormat::Json,
        &props(&["h1", "h2"]),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Transport {
            source: HttpError::Timeout,
            ..
        }
    ));
}

#[tokio::test]
async fn no_hosts_is_an_error() {
    let err = dispatch(
        &ScriptedClient::default(),
        &ExecutorConfig::default(),
        &call(json!({"method": "GET", "url": "/"})),
        PayloadFormat::Json,
        &props(&[]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DispatchError::NoHosts));
}

#[tokio::test]
async fn derives_port_and_passes_tls_settings() {
    let client = ScriptedClient::default().answer("h1", Ok(204));
    let props = RequestProps {
        ssl: true,
        verify: false,
        ..props(&["h1"])
    };
    dispatch(
        &client,
        &ExecutorConfig::default(),
        &call(json!({"method": "DELETE", "url": "/items/1"})),
        PayloadFormat::Json,
        &props,
    )
    .await
    .unwrap();

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen[0].url.scheme(), "https");
    assert_eq!(seen[0].url.port_or_known_default(), Some(443));
    assert!(!seen[0].verify_tls);
    assert_eq!(seen[0].method, "DELETE");
}

#[tokio::test]
async fn encodes_json_and_raw_payloads() {
    let client = ScriptedClient::default().answer("h1", Ok(201));
    let config = ExecutorConfig::default();
    dispatch(
        &client,
        &config,
        &call(json!({
            "method": "POST", "url": "/json",
            "headers": {"X-Trace": "t1"},
            "payload": {"name": "a"}
        })),
        PayloadFormat::Json,
        &props(&["h1"]),
    )
    .await
    .unwrap();
    dispatch(
        &client,
        &config,
        &call(json!({"method": "POST", "url": "/raw", "payload": "<ping/>"})),
        PayloadFormat::Raw,
        &props(&["h1"]),
    )
    .await
    .unwrap();

    let seen = client.seen.lock().unwrap();
    assert_eq!(seen[0].body, br#"{"name":"a"}"#);
    assert_eq!(seen[0].headers["Content-Type"], "application/json");
    assert_eq!(seen[0].headers["X-Trace"], "t1");
    assert_eq!(seen[1].body, b"<ping/>");
    assert!(!seen[1].headers.contains_key("Content-Type"));
}
