//! HTTP list probe.
//!
//! Lists pods through the core/v1 REST endpoint and returns how many items came back. Error
//! responses are decoded as API `Status` objects so they can be classified by their `reason`.
use crate::error::ProbeError;
use reqwest::StatusCode;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, trace};

/// Address `kubectl proxy` listens on by default.
pub const DEFAULT_API_SERVER: &str = "http://127.0.0.1:8001";

const REASON_EXPIRED: &str = "Expired";
const REASON_SERVER_TIMEOUT: &str = "ServerTimeout";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_server: String,
    /// List a single namespace instead of the whole cluster.
    pub namespace: Option<String>,
    pub bearer_token: Option<String>,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Transport-level timeout for a whole request.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_string(),
            namespace: None,
            bearer_token: None,
            insecure: false,
            request_timeout: None,
        }
    }
}

/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ListClient {
    http: reqwest::Client,
    url: String,
    bearer_token: Option<String>,
}

impl ListClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ProbeError> {
        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(config.insecure);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            url: list_url(&config.api_server, config.namespace.as_deref()),
            bearer_token: config.bearer_token.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one list request, returning the number of items listed.
    pub async fn list(&self) -> Result<usize, ProbeError> {
        let mut req = self.http.get(&self.url);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        trace!(%status, bytes = body.len(), "List response");

        if status.is_success() {
            let list: ItemList = serde_json::from_slice(&body)?;
            Ok(list.items.len())
        } else {
            Err(classify(status, &body))
        }
    }
}

fn list_url(api_server: &str, namespace: Option<&str>) -> String {
    let base = api_server.trim_end_matches('/');
    match namespace {
        Some(ns) => format!("{base}/api/v1/namespaces/{ns}/pods"),
        None => format!("{base}/api/v1/pods"),
    }
}

#[derive(Deserialize)]
struct ItemList {
    #[serde(default)]
    items: Vec<IgnoredAny>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ApiStatus {
    reason: String,
    message: String,
}

fn classify(status: StatusCode, body: &[u8]) -> ProbeError {
    let api_status: ApiStatus = serde_json::from_slice(body).unwrap_or_default();
    let message = if api_status.message.is_empty() {
        status.to_string()
    } else {
        api_status.message
    };
    debug!(%status, reason = %api_status.reason, "Classifying error response");

    // Only the status reason classifies; the HTTP code alone never does.
    match api_status.reason.as_str() {
        REASON_EXPIRED => ProbeError::ResourceExpired(message),
        REASON_SERVER_TIMEOUT => ProbeError::ServerTimeout(message),
        _ => ProbeError::Status {
            code: status.as_u16(),
            message,
        },
    }
}
