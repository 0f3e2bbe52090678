//! End-of-run reporting.
use lprobe_core::{AggregateReport, LatencySummary, RunCounts, RunStats, StatsError};
use serde::Serialize;
use std::io::Write;
#[allow(unused)]
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Structured log events.
    #[default]
    Text,
    /// A JSON document on stdout.
    Json,
}

/// Report the run summary once. Summarization failures are logged, never propagated as panics;
/// whatever counts exist are still surfaced.
pub fn flush(stats: &RunStats, format: ReportFormat) -> Result<AggregateReport, StatsError> {
    flush_to(stats, format, &mut std::io::stdout().lock())
}

/// Like [`flush`], writing the `Json` document to `out` instead of stdout.
pub fn flush_to<W: Write>(
    stats: &RunStats,
    format: ReportFormat,
    out: &mut W,
) -> Result<AggregateReport, StatsError> {
    let res = stats.summarize();
    match (&res, format) {
        (Ok(report), ReportFormat::Text) => {
            log_counts(&report.counts);
            let latency = &report.latency;
            info!(
                min = latency.min,
                max = latency.max,
                median = latency.median,
                mean = latency.mean,
                p50 = latency.p50,
                p90 = latency.p90,
                p99 = latency.p99,
                "Request stats: latency(s)"
            );
        }
        (Err(StatsError::NoLatencyData(counts)), ReportFormat::Text) => {
            log_counts(counts);
            warn!("Request stats: no successful requests, latency unavailable");
        }
        (Err(StatsError::EmptyRun), ReportFormat::Text) => {
            warn!("Request stats: no requests were issued");
        }
        (_, ReportFormat::Json) => {
            let doc = JsonReport::from(&res);
            if let Some(error) = &doc.error {
                warn!(%error, "Request stats incomplete");
            }
            if let Err(error) = write_json(out, &doc) {
                error!(%error, "Unable to write request stats");
            }
        }
    }
    res
}

/// The `Json` document. `latency` is null whenever summarizing failed, and `counts` is null only
/// when no request was issued.
#[derive(Debug, Serialize)]
struct JsonReport {
    counts: Option<RunCounts>,
    latency: Option<LatencySummary>,
    error: Option<String>,
}

impl From<&Result<AggregateReport, StatsError>> for JsonReport {
    fn from(res: &Result<AggregateReport, StatsError>) -> Self {
        match res {
            Ok(report) => Self {
                counts: Some(report.counts),
                latency: Some(report.latency),
                error: None,
            },
            Err(err @ StatsError::NoLatencyData(counts)) => Self {
                counts: Some(*counts),
                latency: None,
                error: Some(err.to_string()),
            },
            Err(err @ StatsError::EmptyRun) => Self {
                counts: None,
                latency: None,
                error: Some(err.to_string()),
            },
        }
    }
}

fn write_json<W: Write>(out: &mut W, doc: &JsonReport) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, doc)?;
    writeln!(out)?;
    out.flush()
}

fn log_counts(counts: &RunCounts) {
    info!(
        total = counts.total,
        fail = counts.failure,
        fail_ratio = counts.failure_ratio,
        success = counts.success,
        success_ratio = counts.success_ratio,
        "Request stats"
    );
}
