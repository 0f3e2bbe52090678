//! Mock API server for exercising the probe.
//!
//! Serves pod lists under `/api/v1/pods`. A path prefix selects a failure mode:
//!
//! - `/expired/...` answers `410` with an `Expired` status
//! - `/timeout/...` answers `500` with a `ServerTimeout` status
//! - `/forbidden/...` answers `403`
//! - `/delay/ms/:delay_ms/...` sleeps before answering normally
//! - `/auth/:token/...` requires `Authorization: Bearer <token>`
use axum::{
    debug_handler,
    extract::Path,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use metrics::counter;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::debug;

/// Number of pods in a cluster-wide list.
pub const CLUSTER_POD_COUNT: usize = 3;

pub fn router() -> Router {
    Router::new()
        .route("/api/v1/pods", get(list_all))
        .route("/api/v1/namespaces/:ns/pods", get(list_namespace))
        .route("/expired/api/v1/pods", get(expired))
        .route("/timeout/api/v1/pods", get(server_timeout))
        .route("/forbidden/api/v1/pods", get(forbidden))
        .route("/delay/ms/:delay_ms/api/v1/pods", get(delay))
        .route("/auth/:token/api/v1/pods", get(auth))
}

pub async fn run(listener: TcpListener) {
    axum::serve(listener, router()).await.unwrap();
}

#[debug_handler]
pub async fn list_all() -> Json<Value> {
    counter!("mock-service.list").increment(1);
    Json(pod_list("", CLUSTER_POD_COUNT))
}

#[debug_handler]
pub async fn list_namespace(Path(ns): Path<String>) -> Json<Value> {
    counter!("mock-service.list").increment(1);
    Json(pod_list(&ns, 1))
}

#[debug_handler]
pub async fn expired() -> (StatusCode, Json<Value>) {
    counter!("mock-service.expired").increment(1);
    failure(
        StatusCode::GONE,
        "Expired",
        "too old resource version: 1 (2)",
    )
}

#[debug_handler]
pub async fn server_timeout() -> (StatusCode, Json<Value>) {
    counter!("mock-service.timeout").increment(1);
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "ServerTimeout",
        "the server cannot complete the requested operation at this time, try again later",
    )
}

#[debug_handler]
pub async fn forbidden() -> (StatusCode, Json<Value>) {
    failure(StatusCode::FORBIDDEN, "Forbidden", "pods is forbidden")
}

#[debug_handler]
pub async fn delay(Path(delay_ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Json(pod_list("", CLUSTER_POD_COUNT))
}

#[debug_handler]
pub async fn auth(
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {token}");
    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if provided == Some(expected.as_str()) {
        Ok(Json(pod_list("", CLUSTER_POD_COUNT)))
    } else {
        debug!("MOCK SERVER ___ UNAUTHORIZED");
        Err(failure(StatusCode::UNAUTHORIZED, "Unauthorized", "Unauthorized"))
    }
}

/** Utils **/

fn pod_list(ns: &str, count: usize) -> Value {
    let items: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "metadata": { "name": format!("pod-{i}"), "namespace": ns },
                "status": { "phase": "Running" },
            })
        })
        .collect();

    json!({
        "kind": "PodList",
        "apiVersion": "v1",
        "metadata": { "resourceVersion": "12345" },
        "items": items,
    })
}

fn failure(code: StatusCode, reason: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        code,
        Json(json!({
            "kind": "Status",
            "apiVersion": "v1",
            "status": "Failure",
            "message": message,
            "reason": reason,
            "code": code.as_u16(),
        })),
    )
}
