use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new("mock_service=debug"))
        .init();

    let addr: SocketAddr = "0.0.0.0:3002".parse().unwrap();
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    mock_service::run(listener).await;
}
