use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Closed set of reasons a probe request can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// The consistency token (resource version) the request relied on went stale.
    ResourceExpired,
    /// The target gave up on the request within its own timeout.
    ServerTimeout,
    Other,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCategory::ResourceExpired => write!(f, "resource_expired"),
            FailureCategory::ServerTimeout => write!(f, "server_timeout"),
            FailureCategory::Other => write!(f, "other"),
        }
    }
}

/// Classified result of one probe invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestOutcome {
    Success { latency: Duration },
    Failure { category: FailureCategory },
}
