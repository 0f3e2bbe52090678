#![cfg_attr(docsrs, feature(doc_cfg))]
//! Time-bounded load probe.
//!
//! Repeatedly issues a single list request against a remote API, classifies each outcome,
//! and reports aggregate latency statistics when the run's duration expires or it is cancelled.

pub mod client;
pub mod driver;
pub mod error;
pub mod poller;
pub mod report;
pub mod signals;

pub use client::{ClientConfig, ListClient};
pub use driver::StopReason;
pub use error::{DriverError, ProbeError};
pub use poller::{Poller, PollerRun};

pub use lprobe_core::{
    AggregateReport, FailureCategory, LatencySummary, PollMode, PollerConfig, RequestOutcome,
    RunCounts, RunStats, StatsError,
};

pub mod prelude {
    pub use crate::driver::{run, run_continuous, StopReason};
    pub use crate::poller::{Poller, PollerRun};
    pub use crate::ProbeError;
    pub use lprobe_core::{
        AggregateReport, FailureCategory, PollMode, PollerConfig, RunStats, StatsError,
    };
    pub use tokio_util::sync::CancellationToken;
}
