use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Applies to each request attempt, connect included.
    pub request_timeout: Duration,
    /// Bound on the TCP and TLS handshake alone. A host that does not complete it in time
    /// counts as unreachable and the next host is tried.
    pub connect_timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}
