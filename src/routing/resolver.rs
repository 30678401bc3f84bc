//! Target resolution from the request path.
//!
//! # Responsibilities
//! - Split the path into a service key and the forwarded remainder
//! - Look up the backend host for the service key
//! - Produce the absolute upstream URI
//!
//! # Design Decisions
//! - Pure function of path and configuration; no I/O
//! - The remainder replaces the upstream path entirely (no joining)
//! - The inbound query string is forwarded unchanged

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use axum::http::uri::{Authority, Uri};
use thiserror::Error;

use crate::config::GatewayConfig;

/// Why a path could not be mapped to a backend.
#[derive(Debug, Error)]
pub enum TargetResolutionError {
    /// Fewer than two path segments.
    #[error("failed to parse target host from path: {0}")]
    MalformedPath(String),

    /// First segment is not a registered route.
    #[error("no route registered for service `{0}`")]
    UnknownService(String),

    /// Registered route without a usable backend host.
    #[error("no backend address configured for service `{0}`")]
    MissingHost(String),

    /// The assembled upstream URL did not parse.
    #[error("invalid target url `{url}`: {reason}")]
    InvalidTarget { url: String, reason: String },
}

/// A resolved upstream destination for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    service: String,
    authority: Authority,
    uri: Uri,
}

impl Target {
    /// Service key the target was resolved from.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Absolute upstream URI (`http://host/rest[?query]`).
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Host (and port) of the upstream.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uri)
    }
}

/// Maps request paths to backend targets.
///
/// Built once from the configuration and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct TargetResolver {
    routes: HashSet<String>,
    hosts: BTreeMap<String, String>,
}

impl TargetResolver {
    /// Snapshot the route table and host mappings from the config.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            routes: config.routes.iter().cloned().collect(),
            hosts: config.services.clone(),
        }
    }

    /// Whether a service key was registered at startup.
    pub fn is_registered(&self, service: &str) -> bool {
        self.routes.contains(service)
    }

    /// Resolve a request path (and optional query) to its upstream target.
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Result<Target, TargetResolutionError> {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let Some((service, rest)) = trimmed.split_once('/') else {
            return Err(TargetResolutionError::MalformedPath(path.to_string()));
        };

        if !self.is_registered(service) {
            return Err(TargetResolutionError::UnknownService(service.to_string()));
        }

        let host = self
            .hosts
            .get(service)
            .map(|h| h.trim())
            .map(|h| h.strip_prefix("http://").unwrap_or(h).trim_end_matches('/'))
            .filter(|h| !h.is_empty())
            .ok_or_else(|| TargetResolutionError::MissingHost(service.to_string()))?;

        let url = match query {
            Some(q) => format!("http://{}/{}?{}", host, rest, q),
            None => format!("http://{}/{}", host, rest),
        };

        let uri = url.parse::<Uri>().map_err(|e| {
            TargetResolutionError::InvalidTarget {
                url: url.clone(),
                reason: e.to_string(),
            }
        })?;
        let Some(authority) = uri.authority().cloned() else {
            return Err(TargetResolutionError::InvalidTarget {
                url,
                reason: "missing host".to_string(),
            });
        };

        Ok(Target {
            service: service.to_string(),
            authority,
            uri,
        })
    }
}
