use lprobe::{ClientConfig, FailureCategory, ListClient, ProbeError};
use lprobe_tests::*;

fn client(api_server: String) -> ListClient {
    ListClient::new(&ClientConfig {
        api_server,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn lists_all_pods() {
    init();
    let base = spawn_mock().await;

    let items = client(base).list().await.unwrap();
    assert_eq!(items, mock_service::CLUSTER_POD_COUNT);
}

#[tokio::test]
async fn lists_one_namespace() {
    init();
    let base = spawn_mock().await;

    let client = ListClient::new(&ClientConfig {
        api_server: base,
        namespace: Some("kube-system".to_string()),
        ..Default::default()
    })
    .unwrap();

    assert!(client.url().ends_with("/api/v1/namespaces/kube-system/pods"));
    assert_eq!(client.list().await.unwrap(), 1);
}

#[tokio::test]
async fn classifies_expired() {
    init();
    let base = spawn_mock().await;

    let err = client(format!("{base}/expired")).list().await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::ResourceExpired);
}

#[tokio::test]
async fn classifies_server_timeout() {
    init();
    let base = spawn_mock().await;

    let err = client(format!("{base}/timeout")).list().await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::ServerTimeout);
}

#[tokio::test]
async fn classifies_other_statuses() {
    init();
    let base = spawn_mock().await;

    let err = client(format!("{base}/forbidden")).list().await.unwrap_err();
    assert_eq!(err.category(), FailureCategory::Other);
    assert!(matches!(err, ProbeError::Status { code: 403, .. }));
}

#[tokio::test]
async fn sends_bearer_token() {
    init();
    let base = spawn_mock().await;

    let authed = ListClient::new(&ClientConfig {
        api_server: format!("{base}/auth/s3cret"),
        bearer_token: Some("s3cret".to_string()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(authed.list().await.unwrap(), mock_service::CLUSTER_POD_COUNT);

    let err = client(format!("{base}/auth/s3cret")).list().await.unwrap_err();
    assert!(matches!(err, ProbeError::Status { code: 401, .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    init();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{addr}")).list().await.unwrap_err();
    assert!(matches!(err, ProbeError::Transport(_)));
    assert_eq!(err.category(), FailureCategory::Other);
}
