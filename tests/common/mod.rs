//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use api_gateway::config::GatewayConfig;
use api_gateway::lifecycle::Shutdown;
use api_gateway::HttpServer;
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use futures_util::{stream, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral local port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// An address nothing listens on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Backend that describes the request it received as JSON.
pub async fn start_echo_backend(hits: Arc<AtomicUsize>) -> SocketAddr {
    async fn echo(State(hits): State<Arc<AtomicUsize>>, request: Request<Body>) -> Json<Value> {
        hits.fetch_add(1, Ordering::SeqCst);
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
        let body = serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "host": header("host"),
            "content_type": header("content-type"),
            "content_encoding": header("content-encoding"),
            "forwarded_for": header("x-forwarded-for"),
            "request_id": header("x-request-id"),
            "body": body,
        }))
    }

    spawn_router(Router::new().fallback(echo).with_state(hits)).await
}

/// Backend that answers every request with a fixed status and body.
pub async fn start_status_backend(status: u16, body: &'static str, hits: Arc<AtomicUsize>) -> SocketAddr {
    let status = StatusCode::from_u16(status).unwrap();
    let router = Router::new().fallback(move || {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            (status, body)
        }
    });
    spawn_router(router).await
}

/// Backend that answers only after `delay`.
pub async fn start_slow_backend(delay: Duration) -> SocketAddr {
    let router = Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        "late"
    });
    spawn_router(router).await
}

/// Backend that sends a 500 with a first body chunk and then never finishes.
pub async fn start_stalled_error_backend() -> SocketAddr {
    let router = Router::new().fallback(|| async {
        let chunks = stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(b"{\"partial\":"))])
            .chain(stream::pending());
        (StatusCode::INTERNAL_SERVER_ERROR, Body::from_stream(chunks))
    });
    spawn_router(router).await
}

/// Identity service mock.
///
/// - `good` → `{"data": {"id": "42"}}`
/// - `Bearer good` → `{"data": {"id": "7", "roles": ["admin"]}}`
/// - `user-<n>` → `{"data": {"id": "<n>"}}`
/// - anything else → no `data` field
pub async fn start_identity_service() -> SocketAddr {
    async fn by_token(Path(token): Path<String>) -> Json<Value> {
        let reply = match token.as_str() {
            "good" => json!({"data": {"id": "42"}}),
            "Bearer good" => json!({"data": {"id": "7", "roles": ["admin"]}}),
            other => match other.strip_prefix("user-") {
                Some(n) => json!({"data": {"id": n}}),
                None => json!({"message": "unknown token"}),
            },
        };
        Json(reply)
    }

    spawn_router(Router::new().route("/v1/users/byToken/{token}/", get(by_token))).await
}

/// Config with the given `(service, backend)` pairs and identity service.
pub fn gateway_config(services: &[(&str, SocketAddr)], identity: Option<SocketAddr>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    for (service, addr) in services {
        config.services.insert(service.to_string(), addr.to_string());
    }
    config.identity.address = identity.map(|a| a.to_string());
    config
}

/// Start a gateway; the returned `Shutdown` stops it.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.signalled();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}
