use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::executor::types::ExecutorConfig;

#[derive(Debug, Clone)]
pub struct HttpRequestParts {
    pub method: String,
    pub url: url::Url,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    /// Verify the server's TLS certificate.
    pub verify_tls: bool,
}

#[derive(Debug, Clone)]
pub struct HttpResponseParts {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HttpError {
    #[error("timeout")]
    Timeout,
    /// The host could not be reached at all (DNS, refused connection, TLS handshake). Only
    /// this kind moves the dispatcher on to the next host.
    #[error("connect/dns/tls error: {0}")]
    Network(String),
    #[error("response too large (>{max_bytes} bytes)")]
    ResponseTooLarge { max_bytes: usize },
    #[error("http error: {0}")]
    Other(String),
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(
        &self,
        req: HttpRequestParts,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError>;
}

pub struct ReqwestHttpClient {
    client: reqwest::Client,
    insecure: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn try_new() -> Result<Self, HttpError> {
        Self::with_connect_timeout(ExecutorConfig::default().connect_timeout)
    }

    /// Connection attempts that outlast `connect_timeout` fail as [`HttpError::Network`].
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client(true, connect_timeout)?,
            insecure: build_client(false, connect_timeout)?,
        })
    }
}

fn build_client(verify_tls: bool, connect_timeout: Duration) -> Result<reqwest::Client, HttpError> {
    reqwest::Client::builder()
        .user_agent(concat!("restflow/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(connect_timeout)
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|e| HttpError::Other(format!("failed to create HTTP client: {e}")))
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(
        &self,
        req: HttpRequestParts,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<HttpResponseParts, HttpError> {
        let method = req
            .method
            .to_ascii_uppercase()
            .parse::<reqwest::Method>()
            .map_err(|e| HttpError::Other(format!("invalid method {}: {e}", req.method)))?;
        let client = if req.verify_tls {
            &self.client
        } else {
            &self.insecure
        };
        let mut rb = client.request(method, req.url).timeout(timeout);

        for (k, v) in req.headers {
            rb = rb.header(k, v);
        }

        rb = rb.body(req.body);

        let mut resp = rb.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();

        let mut headers = BTreeMap::new();
        for (k, v) in resp.headers().iter() {
            if let Ok(s) = v.to_str() {
                headers.insert(k.to_string(), s.to_string());
            }
        }

        if resp
            .content_length()
            .is_some_and(|len| len > max_response_bytes as u64)
        {
            return Err(HttpError::ResponseTooLarge {
                max_bytes: max_response_bytes,
            });
        }
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(map_reqwest_error)? {
            if body.len() + chunk.len() > max_response_bytes {
                return Err(HttpError::ResponseTooLarge {
                    max_bytes: max_response_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponseParts {
            status,
            headers,
            body,
        })
    }
}

// The client's connect timeout surfaces as a connect error, so `is_connect` is checked first.
fn map_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_connect() {
        return HttpError::Network(e.to_string());
    }
    if e.is_timeout() {
        return HttpError::Timeout;
    }
    HttpError::Other(e.to_string())
}
