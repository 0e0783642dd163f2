use crate::types::RequestOverrides;

/// Connection settings shared by every call of a sequence.
///
/// These are defaults: a call that declares `port`, `ssl`, `verify` or `hosts` itself wins
/// for that call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RequestProps {
    /// `-1` derives the port from the scheme (443 with ssl, 80 without).
    #[serde(default = "default_port")]
    pub port: i64,
    #[serde(default, alias = "secure")]
    pub ssl: bool,
    /// TLS certificate verification.
    #[serde(default = "default_verify")]
    pub verify: bool,
    /// Candidate hosts, tried in order.
    #[serde(default)]
    pub hosts: Vec<String>,
}

impl Default for RequestProps {
    fn default() -> Self {
        Self {
            port: default_port(),
            ssl: false,
            verify: default_verify(),
            hosts: Vec::new(),
        }
    }
}

fn default_port() -> i64 {
    -1
}

fn default_verify() -> bool {
    true
}

impl RequestProps {
    pub fn with_overrides(&self, overrides: &RequestOverrides) -> RequestProps {
        RequestProps {
            port: overrides.port.unwrap_or(self.port),
            ssl: overrides.ssl.unwrap_or(self.ssl),
            verify: overrides.verify.unwrap_or(self.verify),
            hosts: overrides
                .hosts
                .clone()
                .unwrap_or_else(|| self.hosts.clone()),
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.ssl {
            "https"
        } else {
            "http"
        }
    }

    /// Any negative port is treated like the `-1` sentinel. Out-of-range ports are left for
    /// URL construction to reject.
    pub fn effective_port(&self) -> i64 {
        if self.port >= 0 {
            self.port
        } else if self.ssl {
            443
        } else {
            80
        }
    }
}
