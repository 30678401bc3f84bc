//! Forwarding of a request to its resolved target.
//!
//! # Responsibilities
//! - Rewrite scheme, host and path to exactly the target URI
//! - Send the request over the pooled upstream client
//! - Bound the exchange with the upstream timeout
//!
//! # Design Decisions
//! - The target path replaces the inbound path; nothing is joined
//! - Bodies stream in both directions
//! - Outbound requests always use HTTP/1.1 towards the backend

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{self, HeaderValue, InvalidHeaderValue};
use axum::http::{request, Request, Response, Version};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::proxy::headers::{append_forwarded_for, strip_hop_by_hop};
use crate::routing::Target;

/// Pooled HTTP client used for every backend.
pub type HttpClient = Client<HttpConnector, Body>;

/// Build the upstream client with a connect timeout.
pub fn build_client(connect_timeout: Duration) -> HttpClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    Client::builder(TokioExecutor::new()).build(connector)
}

/// Transport-level failure talking to a backend.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("target host is not a valid header value: {0}")]
    InvalidHost(#[from] InvalidHeaderValue),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

/// Single-host reverse proxy transport.
#[derive(Clone, Debug)]
pub struct ForwardingProxy {
    client: HttpClient,
    timeout: Duration,
}

impl ForwardingProxy {
    pub fn new(client: HttpClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Upstream timeout, also applied to buffering backend error bodies.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward a request to `target` and return the backend response.
    pub async fn forward(
        &self,
        parts: request::Parts,
        body: Body,
        target: &Target,
        client_addr: Option<SocketAddr>,
    ) -> Result<Response<Body>, ProxyError> {
        let request = rewrite_request(parts, body, target, client_addr)?;

        let response = match tokio::time::timeout(self.timeout, self.client.request(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(ProxyError::Timeout(self.timeout)),
        };

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Build the outbound request: target URI, target `Host`, end-to-end headers.
pub fn rewrite_request(
    parts: request::Parts,
    body: Body,
    target: &Target,
    client_addr: Option<SocketAddr>,
) -> Result<Request<Body>, ProxyError> {
    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    if let Some(addr) = client_addr {
        append_forwarded_for(&mut headers, addr.ip());
    }
    headers.insert(header::HOST, HeaderValue::from_str(target.authority().as_str())?);

    let mut request = Request::new(body);
    *request.method_mut() = parts.method;
    *request.uri_mut() = target.uri().clone();
    *request.version_mut() = Version::HTTP_11;
    *request.headers_mut() = headers;
    Ok(request)
}
