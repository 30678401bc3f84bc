//! Backend response interception.
//!
//! # Responsibilities
//! - Pass successful responses through unread
//! - Log and pass through redirect/client/server error bodies verbatim
//! - Mask backend 500s behind a correlation id
//!
//! # Design Decisions
//! - Only exactly 500 is masked; every other status above 300 is logged
//!   and returned as-is
//! - Buffering an error body is bounded by the upstream timeout
//! - The backend body is consumed once and dropped on every path

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Method, Response, StatusCode};
use uuid::Uuid;

use crate::observability::metrics;
use crate::proxy::forward::ProxyError;
use crate::routing::Target;

/// Statuses strictly above this value are logged.
pub const LOGGED_STATUS_FLOOR: u16 = 300;

/// Caller-visible body for a masked backend 500.
pub fn masked_message(error_id: Uuid) -> String {
    format!("error {}", error_id)
}

/// Inspect a backend response before it is returned to the caller.
///
/// Fails with [`ProxyError::Timeout`] when an error body does not arrive
/// within `read_timeout`.
pub async fn intercept(
    response: Response<Body>,
    method: &Method,
    target: &Target,
    read_timeout: Duration,
) -> Result<Response<Body>, ProxyError> {
    let status = response.status();

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        let (mut parts, body) = response.into_parts();
        let captured = read_body(body, target, read_timeout).await?;
        let error_id = Uuid::new_v4();

        tracing::error!(
            error_id = %error_id,
            upstream = %target,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&captured),
            "Backend internal error masked"
        );
        metrics::record_masked_error(target.service());

        let masked = masked_message(error_id);
        parts.headers.remove(header::CONTENT_ENCODING);
        parts.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        set_content_length(&mut parts.headers, masked.len());
        Ok(Response::from_parts(parts, Body::from(masked)))
    } else if status.as_u16() > LOGGED_STATUS_FLOOR {
        let (mut parts, body) = response.into_parts();
        let captured = read_body(body, target, read_timeout).await?;

        if status.is_server_error() {
            tracing::error!(
                upstream = %target,
                status = status.as_u16(),
                body = %String::from_utf8_lossy(&captured),
                "Backend error response"
            );
        } else {
            tracing::warn!(
                upstream = %target,
                status = status.as_u16(),
                body = %String::from_utf8_lossy(&captured),
                "Backend non-success response"
            );
        }

        // HEAD and 304 carry no body but advertise the representation length.
        if *method != Method::HEAD && status != StatusCode::NOT_MODIFIED {
            set_content_length(&mut parts.headers, captured.len());
        }
        Ok(Response::from_parts(parts, Body::from(captured)))
    } else {
        Ok(response)
    }
}

async fn read_body(body: Body, target: &Target, read_timeout: Duration) -> Result<Bytes, ProxyError> {
    match tokio::time::timeout(read_timeout, axum::body::to_bytes(body, usize::MAX)).await {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => {
            tracing::warn!(upstream = %target, error = %e, "Failed to read backend response body");
            Ok(Bytes::new())
        }
        Err(_) => {
            tracing::error!(upstream = %target, "Backend response body stalled");
            Err(ProxyError::Timeout(read_timeout))
        }
    }
}

fn set_content_length(headers: &mut HeaderMap, len: usize) {
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
}
