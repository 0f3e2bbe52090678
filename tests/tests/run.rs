use lprobe::prelude::*;
use lprobe::{ClientConfig, ListClient};
use lprobe_tests::*;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

type ListFuture = Pin<Box<dyn Future<Output = Result<usize, ProbeError>> + Send>>;

fn list_probe(api_server: String) -> impl Fn() -> ListFuture + Clone + Send + Sync + 'static {
    let client = ListClient::new(&ClientConfig {
        api_server,
        ..Default::default()
    })
    .unwrap();

    move || -> ListFuture {
        let client = client.clone();
        Box::pin(async move { client.list().await })
    }
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn run_against_mock_service() {
    init();
    let base = spawn_mock().await;

    let run = Poller::new("pods", list_probe(base))
        .duration(Duration::from_secs(1))
        .interval(Duration::from_millis(100))
        .await
        .unwrap();

    assert_eq!(run.stop, StopReason::Deadline);
    assert_eq!(run.stats.failure_count(), 0);
    let successes = run.stats.success_count();
    assert!((5..=11).contains(&successes), "{successes} successes");

    let report = run.stats.summarize().unwrap();
    assert_eq!(report.counts.success, successes);
    assert_eq!(report.counts.success_ratio, 100.);
    assert!(report.latency.min <= report.latency.p50);
    assert!(report.latency.p50 <= report.latency.p90);
    assert!(report.latency.p90 <= report.latency.p99);
    assert!(report.latency.p99 <= report.latency.max);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn failing_run_still_reports_counts() {
    init();
    let base = spawn_mock().await;

    let run = Poller::new("pods", list_probe(format!("{base}/expired")))
        .duration(Duration::from_millis(500))
        .interval(Duration::from_millis(100))
        .await
        .unwrap();

    assert_eq!(run.stats.success_count(), 0);
    assert!(run.stats.failure_count() >= 1);
    match run.stats.summarize() {
        Err(StatsError::NoLatencyData(counts)) => assert_eq!(counts.failure_ratio, 100.),
        other => panic!("expected NoLatencyData, got {other:?}"),
    }
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn cancellation_stops_a_long_run() {
    init();
    let base = spawn_mock().await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let start = Instant::now();
    let run = Poller::new("pods", list_probe(base))
        .duration(Duration::from_secs(60))
        .interval(Duration::from_secs(5))
        .cancel_on(token)
        .await
        .unwrap();

    assert_eq!(run.stop, StopReason::Cancelled);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(run.stats.success_count(), 1);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn slow_responses_hit_probe_timeout() {
    init();
    let base = spawn_mock().await;

    let run = Poller::new("pods", list_probe(format!("{base}/delay/ms/2000")))
        .duration(Duration::from_millis(600))
        .interval(Duration::from_millis(100))
        .probe_timeout(Duration::from_millis(100))
        .await
        .unwrap();

    assert_eq!(run.stats.success_count(), 0);
    assert!(run.stats.failure_count() >= 1);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn driver_threads_caller_owned_stats() {
    init();
    let base = spawn_mock().await;

    let mut config = PollerConfig::new("pods");
    config.duration = Duration::from_millis(300);
    config.interval = Duration::from_millis(100);

    let cancel = CancellationToken::new();
    let mut first = RunStats::new();
    let mut second = RunStats::new();
    run(list_probe(base.clone()), &config, &cancel, &mut first)
        .await
        .unwrap();
    run(list_probe(format!("{base}/timeout")), &config, &cancel, &mut second)
        .await
        .unwrap();

    assert_eq!(first.failure_count(), 0);
    assert!(first.success_count() >= 1);
    assert_eq!(second.success_count(), 0);
    assert!(second.failure_count() >= 1);
}
