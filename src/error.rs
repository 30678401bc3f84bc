//! Error types surfaced to callers of the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::proxy::ProxyError;
use crate::routing::TargetResolutionError;

/// Errors that end a request before a backend response is available.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The path could not be mapped to a backend.
    #[error(transparent)]
    Resolution(#[from] TargetResolutionError),

    /// The backend could not be reached in time.
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl GatewayError {
    /// HTTP status returned to the caller.
    ///
    /// A registered service with no configured host is a deployment
    /// problem, so it is a 500 rather than a 404.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Resolution(TargetResolutionError::MalformedPath(_))
            | GatewayError::Resolution(TargetResolutionError::UnknownService(_)) => {
                StatusCode::NOT_FOUND
            }
            GatewayError::Resolution(TargetResolutionError::MissingHost(_))
            | GatewayError::Resolution(TargetResolutionError::InvalidTarget { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Proxy(ProxyError::InvalidHost(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Proxy(ProxyError::Upstream(_)) => StatusCode::BAD_GATEWAY,
            GatewayError::Proxy(ProxyError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail stays in the logs; callers only see the reason phrase.
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, Json(json!({"error": reason}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn resolution_errors_map_to_statuses() {
        let malformed = GatewayError::from(TargetResolutionError::MalformedPath("/x".into()));
        assert_eq!(malformed.status(), StatusCode::NOT_FOUND);

        let unknown = GatewayError::from(TargetResolutionError::UnknownService("admin".into()));
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

        let missing = GatewayError::from(TargetResolutionError::MissingHost("sms".into()));
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let invalid = GatewayError::from(TargetResolutionError::InvalidTarget {
            url: "http://bad host/".into(),
            reason: "invalid uri character".into(),
        });
        assert_eq!(invalid.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn timeout_maps_to_504() {
        let err = GatewayError::from(ProxyError::Timeout(Duration::from_secs(3)));
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn response_body_hides_internal_detail() {
        let err = GatewayError::from(TargetResolutionError::MissingHost("payment".into()));
        assert!(err.to_string().contains("payment"), "Display must include the service");

        let response = err.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"error": "Internal Server Error"}));
    }
}
