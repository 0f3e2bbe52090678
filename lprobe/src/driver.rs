//! Polling driver.
//!
//! Issues one probe request per iteration until the run's deadline passes or the cancellation
//! token fires. Each result is classified and recorded into the caller's [`RunStats`]; a failed
//! probe is never fatal to the run.
use crate::error::{DriverError, ProbeError};
use lprobe_core::{FailureCategory, PollMode, PollerConfig, RequestOutcome, RunStats};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Why a run stopped. Once stopped, a run never resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deadline,
    Cancelled,
}

/// Run the driver variant selected by `config.mode`.
#[instrument(name = "poller", skip_all, fields(name = %config.name, mode = %config.mode))]
pub async fn run<T, F>(
    probe: T,
    config: &PollerConfig,
    cancel: &CancellationToken,
    stats: &mut RunStats,
) -> Result<StopReason, DriverError>
where
    T: Fn() -> F,
    F: Future<Output = Result<usize, ProbeError>>,
{
    config.validate()?;
    match config.mode {
        PollMode::Continuous => Ok(run_continuous(probe, config, cancel, stats).await),
        PollMode::Paginated => run_paginated(probe, config, cancel, stats).await,
    }
}

/// Probe continuously, one full list request per iteration.
///
/// The deadline is fixed once at entry. Cancellation is observed at the top of every iteration
/// and during the pause between requests, but never inside the probe itself: an in-flight
/// request runs to completion unless `config.probe_timeout` bounds it.
pub async fn run_continuous<T, F>(
    probe: T,
    config: &PollerConfig,
    cancel: &CancellationToken,
    stats: &mut RunStats,
) -> StopReason
where
    T: Fn() -> F,
    F: Future<Output = Result<usize, ProbeError>>,
{
    info!(
        "Probing {} for {} every {}",
        config.name,
        humantime::format_duration(config.duration),
        humantime::format_duration(config.interval),
    );

    let deadline = Instant::now() + config.duration;
    loop {
        if cancel.is_cancelled() {
            info!("Run cancelled, stopping");
            return StopReason::Cancelled;
        }

        if Instant::now() >= deadline {
            info!(
                "Run ended after {}",
                humantime::format_duration(config.duration)
            );
            return StopReason::Deadline;
        }

        let (took, res) = probe_once(&probe, config.probe_timeout).await;
        let outcome = match res {
            Ok(items) => {
                info!(
                    count = stats.success_count() + 1,
                    items,
                    took = ?took,
                    "List completed"
                );
                RequestOutcome::Success { latency: took }
            }
            Err(err) => {
                let category = err.category();
                match category {
                    FailureCategory::ResourceExpired => {
                        warn!(error = %err, "List failed: resource version expired")
                    }
                    FailureCategory::ServerTimeout => {
                        warn!(took = ?took, error = %err, "List failed: server timeout")
                    }
                    FailureCategory::Other => warn!(error = %err, "List failed"),
                }
                RequestOutcome::Failure { category }
            }
        };

        #[cfg(feature = "metrics")]
        record_metrics(&outcome, took);
        stats.record(outcome);

        pause(config.interval, deadline, cancel).await;
    }
}

/// Paginated listing has no agreed page size or continuation policy yet, so this variant
/// refuses to run rather than report an empty result as a success.
pub async fn run_paginated<T, F>(
    _probe: T,
    config: &PollerConfig,
    _cancel: &CancellationToken,
    _stats: &mut RunStats,
) -> Result<StopReason, DriverError>
where
    T: Fn() -> F,
    F: Future<Output = Result<usize, ProbeError>>,
{
    // TODO: Page through results with `limit`/`continue` once a page size and per-page latency
    // accounting are decided.
    warn!("Paginated listing requested for {}; not implemented", config.name);
    Err(DriverError::PaginationUnsupported)
}

async fn probe_once<T, F>(
    probe: &T,
    timeout: Option<Duration>,
) -> (Duration, Result<usize, ProbeError>)
where
    T: Fn() -> F,
    F: Future<Output = Result<usize, ProbeError>>,
{
    let start = Instant::now();
    let res = match timeout {
        Some(limit) => tokio::time::timeout(limit, probe())
            .await
            .unwrap_or(Err(ProbeError::TimedOut(limit))),
        None => probe().await,
    };
    (start.elapsed(), res)
}

/// Wait out the inter-request interval, waking early on cancellation or at the deadline.
async fn pause(interval: Duration, deadline: Instant, cancel: &CancellationToken) {
    let wake = (Instant::now() + interval).min(deadline);
    tokio::select! {
        _ = cancel.cancelled() => trace!("Cancelled during pause"),
        _ = sleep_until(wake) => {}
    }
}

#[cfg(feature = "metrics")]
fn record_metrics(outcome: &RequestOutcome, took: Duration) {
    metrics::describe_histogram!("lprobe_probe_latency", metrics::Unit::Seconds, "");
    metrics::histogram!("lprobe_probe_latency").record(took.as_secs_f64());

    match outcome {
        RequestOutcome::Success { .. } => {
            metrics::counter!("lprobe_probe_success").increment(1);
        }
        RequestOutcome::Failure { category } => {
            metrics::counter!("lprobe_probe_error", "category" => category.to_string())
                .increment(1);
        }
    }
}
