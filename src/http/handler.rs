//! The dispatch pipeline behind every gateway route.
//!
//! ```text
//! request
//!     → TargetResolver::resolve     (404 / 500, no upstream call)
//!     → IdentityEnricher::enrich    (uncompressed JSON or undeclared bodies only)
//!     → ForwardingProxy::forward    (502 / 504 on transport failure)
//!     → interceptor::intercept      (mask 500, log > 300, 504 on a stalled body)
//!     → caller
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{header, request, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use tracing::Instrument;

use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::identity::enricher::{is_enrichable, IdentityEnricher};
use crate::observability::metrics;
use crate::proxy::intercept;

/// Route handler for `/{service}/{*rest}`.
pub async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers());
    let span = tracing::info_span!(
        "dispatch",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );
    dispatch(state, request).instrument(span).await
}

async fn dispatch(state: AppState, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let target = match state
        .resolver
        .resolve(request.uri().path(), request.uri().query())
    {
        Ok(target) => target,
        Err(e) => return reject(GatewayError::from(e), method.as_str(), "none", start),
    };

    tracing::debug!(upstream = %target, "Target resolved");

    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    let (mut parts, body) = request.into_parts();
    let body = if is_enrichable(&parts.headers) {
        enrich_request(&state.enricher, &mut parts, body).await
    } else {
        body
    };

    let forwarded = match state.proxy.forward(parts, body, &target, client_addr).await {
        Ok(response) => intercept(response, &method, &target, state.proxy.timeout()).await,
        Err(e) => Err(e),
    };

    match forwarded {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(method.as_str(), status.as_u16(), target.service(), start);
            tracing::debug!(
                upstream = %target,
                status = status.as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request forwarded"
            );
            response
        }
        Err(e) => {
            tracing::error!(upstream = %target, error = %e, "Upstream error");
            reject(GatewayError::from(e), method.as_str(), target.service(), start)
        }
    }
}

/// Buffer the body, inject the caller identity and fix up the framing headers.
async fn enrich_request(enricher: &IdentityEnricher, parts: &mut request::Parts, body: Body) -> Body {
    let raw = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body, enriching an empty body");
            Bytes::new()
        }
    };

    let enriched = enricher.enrich(&parts.headers, &raw).await;

    parts.headers.remove(header::TRANSFER_ENCODING);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    parts
        .headers
        .insert(header::CONTENT_LENGTH, HeaderValue::from(enriched.len()));
    Body::from(enriched)
}

fn reject(error: GatewayError, method: &str, service: &str, start: Instant) -> Response {
    let status = error.status();
    if status.is_server_error() {
        tracing::error!(status = status.as_u16(), error = %error, "Request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %error, "Request rejected");
    }
    metrics::record_request(method, status.as_u16(), service, start);
    error.into_response()
}
