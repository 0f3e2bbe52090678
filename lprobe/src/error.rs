use lprobe_core::{ConfigError, FailureCategory};
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong with a single probe request.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Resource version expired: {0}")]
    ResourceExpired(String),

    #[error("Server timeout: {0}")]
    ServerTimeout(String),

    #[error("Unexpected status {code}: {message}")]
    Status { code: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unable to decode list response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Probe did not complete within {}", human(.0))]
    TimedOut(Duration),
}

impl ProbeError {
    pub fn category(&self) -> FailureCategory {
        match self {
            ProbeError::ResourceExpired(_) => FailureCategory::ResourceExpired,
            ProbeError::ServerTimeout(_) => FailureCategory::ServerTimeout,
            ProbeError::Status { .. }
            | ProbeError::Transport(_)
            | ProbeError::Decode(_)
            | ProbeError::TimedOut(_) => FailureCategory::Other,
        }
    }
}

fn human(dur: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*dur)
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Invalid poller configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Paginated listing is not implemented; no requests were issued.")]
    PaginationUnsupported,
}
