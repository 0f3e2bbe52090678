use crate::{DEFAULT_DURATION, DEFAULT_INTERVAL};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which driver variant a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollMode {
    /// One full list call per iteration.
    #[default]
    Continuous,
    /// Page through the result set across several calls per iteration.
    Paginated,
}

impl fmt::Display for PollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollMode::Continuous => write!(f, "continuous"),
            PollMode::Paginated => write!(f, "paginated"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Run duration must be greater than zero.")]
    ZeroDuration,

    #[error("Interval between requests must be greater than zero.")]
    ZeroInterval,

    #[error("Probe timeout must be greater than zero when set.")]
    ZeroProbeTimeout,
}

/// Parameters of a single probe run. Read once by the driver at entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollerConfig {
    pub name: String,
    pub duration: Duration,
    pub interval: Duration,
    pub probe_timeout: Option<Duration>,
    pub mode: PollMode,
}

impl PollerConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            duration: DEFAULT_DURATION,
            interval: DEFAULT_INTERVAL,
            probe_timeout: None,
            mode: PollMode::Continuous,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.is_zero() {
            return Err(ConfigError::ZeroDuration);
        }
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if matches!(self.probe_timeout, Some(t) if t.is_zero()) {
            return Err(ConfigError::ZeroProbeTimeout);
        }
        Ok(())
    }
}
