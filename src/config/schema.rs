//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Service keys registered when no route list is configured.
pub const DEFAULT_ROUTES: &[&str] = &[
    "user", "event", "sms", "blog", "album", "payment", "target1",
];

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Registered service keys. The first path segment of a request must
    /// be one of these.
    pub routes: Vec<String>,

    /// Backend host (`host[:port]`) per service key.
    pub services: BTreeMap<String, String>,

    /// Identity service settings.
    pub identity: IdentityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routes: DEFAULT_ROUTES.iter().map(|r| r.to_string()).collect(),
            services: BTreeMap::new(),
            identity: IdentityConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Backend host configured for a service key, if any.
    pub fn service_host(&self, service: &str) -> Option<&str> {
        self.services.get(service).map(String::as_str)
    }

    /// Whether the service key is a registered route.
    pub fn is_registered(&self, service: &str) -> bool {
        self.routes.iter().any(|r| r == service)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port.
    pub port: u16,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Base address of the identity service. A value without a scheme is
    /// treated as plain HTTP. `None` disables identity lookups.
    pub address: Option<String>,

    /// Lookup timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            address: None,
            timeout_secs: 5,
        }
    }
}

impl IdentityConfig {
    /// Identity base address with a scheme, or `None` when unset or blank.
    pub fn base_url(&self) -> Option<String> {
        let address = self.address.as_deref()?.trim();
        if address.is_empty() {
            return None;
        }
        if address.contains("://") {
            Some(address.to_string())
        } else {
            Some(format!("http://{}", address))
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Backend connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the backend to answer (until response headers).
    pub upstream_secs: u64,

    /// Total time for an inbound request, enforced by the server layer.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
