//! Route handlers.
//!
//! Every handler answers 200 with JSON. `/data` serves whatever the snapshot
//! currently holds, stale or empty included.

use axum::{
    extract::State,
    http::{HeaderMap, Method, Version},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::http::request::{log_call, CallLog};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::snapshot::Snapshot;
use crate::watch::event::TargetRef;

/// Environment variable reported as `pod` by `/info`.
pub const POD_ENV: &str = "CM2HTTP_POD_NAME";
/// Environment variable reported as `cluster` by `/info`.
pub const CLUSTER_ENV: &str = "CM2HTTP_CLUSTER_NAME";

/// Static facts about this instance, captured at startup.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub pod: String,
    pub cluster: String,
    pub target: TargetRef,
    pub key: Option<String>,
}

impl ServiceInfo {
    /// Read pod and cluster names from the environment; unset means empty.
    pub fn from_env(target: TargetRef, key: Option<String>) -> Self {
        Self {
            pod: std::env::var(POD_ENV).unwrap_or_default(),
            cluster: std::env::var(CLUSTER_ENV).unwrap_or_default(),
            target,
            key,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub pod: String,
    pub cluster: String,
    pub datetime: DateTime<Utc>,
}

pub async fn get_data(
    State(state): State<AppState>,
    method: Method,
    version: Version,
    headers: HeaderMap,
) -> Json<Snapshot> {
    metrics::record_request("data");
    let snapshot = state.store.read();
    log_call(&state, "/data", &method, version, &headers, CallLog::Always);
    Json(snapshot)
}

/// Pod and cluster names come from [`ServiceInfo`], read from the
/// environment once at startup. Only `datetime` is taken per request.
pub async fn get_info(
    State(state): State<AppState>,
    method: Method,
    version: Version,
    headers: HeaderMap,
) -> Json<InfoResponse> {
    metrics::record_request("info");
    log_call(&state, "/info", &method, version, &headers, CallLog::Always);
    Json(InfoResponse {
        pod: state.info.pod.clone(),
        cluster: state.info.cluster.clone(),
        datetime: Utc::now(),
    })
}

pub async fn get_healthz(
    State(state): State<AppState>,
    method: Method,
    version: Version,
    headers: HeaderMap,
) -> Json<Value> {
    metrics::record_request("healthz");
    log_call(&state, "/healthz", &method, version, &headers, CallLog::DebugOnly);
    Json(json!({ "healthy": "true" }))
}

pub async fn get_readyz(
    State(state): State<AppState>,
    method: Method,
    version: Version,
    headers: HeaderMap,
) -> Json<Value> {
    metrics::record_request("readyz");
    log_call(&state, "/readyz", &method, version, &headers, CallLog::DebugOnly);
    Json(json!({ "ready": "true" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_info_is_captured_once() {
        std::env::set_var(POD_ENV, "cm2http-abc12");
        std::env::remove_var(CLUSTER_ENV);
        let info = ServiceInfo::from_env(TargetRef::new("kube-system", "kube-root-ca.crt"), None);

        std::env::set_var(POD_ENV, "cm2http-later");
        assert_eq!(info.pod, "cm2http-abc12");
        assert_eq!(info.cluster, "");
        std::env::remove_var(POD_ENV);
    }
}
