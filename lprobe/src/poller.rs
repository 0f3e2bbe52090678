//! Builder-style handle for a probe run.
use crate::driver::{self, StopReason};
use crate::error::{DriverError, ProbeError};
use lprobe_core::{PollMode, PollerConfig, RunStats};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tokio_util::sync::CancellationToken;

/// Result of a completed run: how it stopped, and everything it recorded.
#[derive(Debug)]
pub struct PollerRun {
    pub stop: StopReason,
    pub stats: RunStats,
}

type RunnerFuture = Pin<Box<dyn Future<Output = Result<PollerRun, DriverError>> + Send>>;

/// A probe run which starts when first polled.
///
/// # Example
/// ```no_run
/// use lprobe::prelude::*;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let run = Poller::new("pods", || async { Ok::<usize, ProbeError>(0) })
///         .duration(Duration::from_secs(60))
///         .interval(Duration::from_secs(1))
///         .await
///         .unwrap();
///
///     println!("{:?}", run.stats.summarize());
/// }
/// ```
#[pin_project::pin_project]
pub struct Poller<T> {
    probe: T,
    runner_fut: Option<RunnerFuture>,
    config: PollerConfig,
    cancel: CancellationToken,
}

impl<T> Poller<T> {
    pub fn new(name: &str, probe: T) -> Self {
        Self {
            probe,
            runner_fut: None,
            config: PollerConfig::new(name),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop issuing requests once `duration` has elapsed.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Pause between consecutive requests.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Give up on a single request after `timeout`, recording it as a failure.
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = Some(timeout);
        self
    }

    pub fn paginated(mut self) -> Self {
        self.config.mode = PollMode::Paginated;
        self
    }

    /// Stop early when `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }
}

impl<T, F> Future for Poller<T>
where
    T: Fn() -> F + Send + Sync + 'static + Clone,
    F: Future<Output = Result<usize, ProbeError>> + Send + 'static,
{
    type Output = Result<PollerRun, DriverError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let runner = this.runner_fut.get_or_insert_with(|| -> RunnerFuture {
            let probe = this.probe.clone();
            let config = this.config.clone();
            let cancel = this.cancel.clone();
            Box::pin(async move {
                let mut stats = RunStats::new();
                let stop = driver::run(probe, &config, &cancel, &mut stats).await?;
                Ok(PollerRun { stop, stats })
            })
        });

        runner.as_mut().poll(cx)
    }
}
