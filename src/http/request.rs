//! Request identification and call logging.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Log handled calls with the details operators grep for
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Probe routes log at debug so kubelet polling stays quiet at info

use axum::http::{HeaderMap, HeaderValue, Method, Request, Version};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::server::AppState;

/// Header carrying the request ID in both directions.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// What gets logged about each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallLog {
    /// Data and info routes.
    Always,
    /// Liveness and readiness probes.
    DebugOnly,
}

pub(crate) fn log_call(
    state: &AppState,
    route: &'static str,
    method: &Method,
    version: Version,
    headers: &HeaderMap,
    mode: CallLog,
) {
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let target = &state.info.target;
    let key = state.info.key.as_deref().unwrap_or("");

    match mode {
        CallLog::Always => tracing::info!(
            request_id = %request_id,
            method = %method,
            protocol = ?version,
            user_agent = %user_agent,
            namespace = %target.namespace,
            configmap = %target.name,
            key = %key,
            "{} endpoint called",
            route
        ),
        CallLog::DebugOnly => tracing::debug!(
            request_id = %request_id,
            method = %method,
            protocol = ?version,
            user_agent = %user_agent,
            namespace = %target.namespace,
            configmap = %target.name,
            key = %key,
            "{} endpoint called",
            route
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique_uuids() {
        let request = Request::new(());
        let mut maker = UuidRequestId;
        let first = maker.make_request_id(&request).unwrap();
        let second = maker.make_request_id(&request).unwrap();

        let first = first.header_value().to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second.header_value().to_str().unwrap());
    }
}
