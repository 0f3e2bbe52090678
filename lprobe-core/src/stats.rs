use crate::RequestOutcome;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("No requests were recorded; nothing to summarize.")]
    EmptyRun,

    /// Only failures were recorded. The counts are still available for reporting.
    #[error("No successful requests were recorded; latency statistics are undefined ({0}).")]
    NoLatencyData(RunCounts),
}

/// Mutable aggregate state for one run.
///
/// Owned by whoever drives the run and threaded through the driver by `&mut`, so that two runs
/// never share counters. Latencies are kept in seconds, one per successful request, in the order
/// they were observed.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    success_count: u64,
    failure_count: u64,
    latency_samples: Vec<f64>,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            success_count: 0,
            failure_count: 0,
            latency_samples: Vec::with_capacity(10),
        }
    }

    pub fn record_success(&mut self, latency: Duration) {
        self.latency_samples.push(latency.as_secs_f64());
        self.success_count += 1;
    }

    pub fn record_failure(&mut self) {
        self.failure_count += 1;
    }

    pub fn record(&mut self, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::Success { latency } => self.record_success(latency),
            RequestOutcome::Failure { .. } => self.record_failure(),
        }
    }

    pub fn success_count(&self) -> u64 {
        self.success_count
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    pub fn total(&self) -> u64 {
        self.success_count + self.failure_count
    }

    pub fn latency_samples(&self) -> &[f64] {
        &self.latency_samples
    }

    pub fn counts(&self) -> Result<RunCounts, StatsError> {
        let total = self.total();
        if total == 0 {
            return Err(StatsError::EmptyRun);
        }

        Ok(RunCounts {
            total,
            success: self.success_count,
            failure: self.failure_count,
            success_ratio: self.success_count as f64 / total as f64 * 100.,
            failure_ratio: self.failure_count as f64 / total as f64 * 100.,
        })
    }

    /// Compute the end-of-run report. Does not mutate; repeated calls on unchanged state
    /// return identical reports.
    pub fn summarize(&self) -> Result<AggregateReport, StatsError> {
        let counts = self.counts()?;
        if self.latency_samples.is_empty() {
            return Err(StatsError::NoLatencyData(counts));
        }

        Ok(AggregateReport {
            counts,
            latency: LatencySummary::from_samples(&self.latency_samples),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunCounts {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    /// Percentage of `total`, in `[0, 100]`.
    pub success_ratio: f64,
    /// Percentage of `total`, in `[0, 100]`.
    pub failure_ratio: f64,
}

impl fmt::Display for RunCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total={}, Success={} ({:.2}%), Failure={} ({:.2}%)",
            self.total, self.success, self.success_ratio, self.failure, self.failure_ratio,
        )
    }
}

/// Latency statistics, all in seconds.
///
/// Percentiles use the nearest-rank rule: for `n` ascending samples the `p`th percentile is the
/// sample at 1-based rank `ceil(p * n / 100)`. No interpolation is done, so every reported
/// percentile is a value that was actually observed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p50: f64,
    pub p90: f64,
    pub p99: f64,
}

impl LatencySummary {
    fn from_samples(samples: &[f64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: statistical::mean(&sorted),
            median: statistical::median(&sorted),
            p50: percentile(&sorted, 50.),
            p90: percentile(&sorted, 90.),
            p99: percentile(&sorted, 99.),
        }
    }
}

impl fmt::Display for LatencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "min={:?}, max={:?}, mean={:?}, median={:?}, p50={:?}, p90={:?}, p99={:?}",
            Duration::from_secs_f64(self.min),
            Duration::from_secs_f64(self.max),
            Duration::from_secs_f64(self.mean),
            Duration::from_secs_f64(self.median),
            Duration::from_secs_f64(self.p50),
            Duration::from_secs_f64(self.p90),
            Duration::from_secs_f64(self.p99),
        )
    }
}

/// End-of-run summary derived from [`RunStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateReport {
    pub counts: RunCounts,
    pub latency: LatencySummary,
}

impl fmt::Display for AggregateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.counts, self.latency)
    }
}

// `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    // NOTE: multiply before dividing so whole ranks (e.g. p90 of 10) stay exact.
    let rank = (pct * sorted.len() as f64 / 100.).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
