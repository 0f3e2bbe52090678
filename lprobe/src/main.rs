use anyhow::{Context, Result};
use clap::Parser;
use lprobe::client::{ClientConfig, ListClient, DEFAULT_API_SERVER};
use lprobe::driver;
use lprobe::error::DriverError;
use lprobe::report::{self, ReportFormat};
use lprobe::signals;
use lprobe_core::{
    ConfigError, PollMode, PollerConfig, RunStats, DEFAULT_DURATION, DEFAULT_INTERVAL,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Repeatedly list pods against an API server and report request latency statistics.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Base URL of the API server.
    #[arg(long, default_value = DEFAULT_API_SERVER)]
    api_server: String,

    /// File holding a bearer token to authenticate with.
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Only list pods in this namespace (default: all namespaces).
    #[arg(short, long)]
    namespace: Option<String>,

    /// How long this test runs, e.g. `15m` or `90s`.
    #[arg(short, long, default_value_t = DEFAULT_DURATION.into())]
    duration: humantime::Duration,

    /// Pause between two list requests.
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL.into())]
    interval: humantime::Duration,

    /// Give up on a single list request after this long (default: wait for the transport).
    #[arg(long, value_parser = humantime::parse_duration)]
    probe_timeout: Option<Duration>,

    /// Transport-level timeout for each HTTP request.
    #[arg(long, value_parser = humantime::parse_duration)]
    request_timeout: Option<Duration>,

    /// Page through the results instead of listing everything at once.
    #[arg(long)]
    enable_pagination: bool,

    /// Skip TLS certificate verification.
    #[arg(long)]
    insecure: bool,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

fn poller_config(args: &Cli, name: &str) -> Result<PollerConfig, ConfigError> {
    let config = PollerConfig {
        name: name.to_string(),
        duration: args.duration.into(),
        interval: args.interval.into(),
        probe_timeout: args.probe_timeout,
        mode: if args.enable_pagination {
            PollMode::Paginated
        } else {
            PollMode::Continuous
        },
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lprobe=info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let bearer_token = match &args.token_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading token file {}", path.display()))?
                .trim()
                .to_string(),
        ),
        None => None,
    };

    let client = ListClient::new(&ClientConfig {
        api_server: args.api_server.clone(),
        namespace: args.namespace.clone(),
        bearer_token,
        insecure: args.insecure,
        request_timeout: args.request_timeout,
    })
    .context("building API client")?;
    info!(url = client.url(), "Listing pods");

    let config = poller_config(&args, client.url()).context("invalid run configuration")?;

    let cancel = CancellationToken::new();
    let listener = signals::cancel_on_shutdown(cancel.clone());

    let probe = move || {
        let client = client.clone();
        async move { client.list().await }
    };

    let mut stats = RunStats::new();
    let res = driver::run(probe, &config, &cancel, &mut stats).await;

    cancel.cancel();
    let _ = listener.await;

    match res {
        Ok(stop) => info!(?stop, "Probe run finished"),
        Err(error @ DriverError::PaginationUnsupported) => warn!(%error, "Probe run skipped"),
        Err(error) => return Err(error).context("probe run failed"),
    }

    let _ = report::flush(&stats, args.format);
    Ok(())
}
