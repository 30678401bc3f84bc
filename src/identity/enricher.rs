//! Request body enrichment with caller identity.
//!
//! # Responsibilities
//! - Decide whether a request carries a JSON body worth enriching
//! - Resolve the caller identity from the `Authorization` header
//! - Inject the identity as the body's `user` field
//!
//! # Design Decisions
//! - Enrichment never fails a request: bad bodies become `{}`, failed
//!   lookups become the anonymous identity
//! - Every other body field is carried over untouched

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde_json::{Map, Value};

use crate::identity::client::IdentityProvider;
use crate::observability::metrics;

/// Body field that receives the identity.
pub const USER_FIELD: &str = "user";

/// Caller identity attached to a forwarded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    /// Record returned by the identity service.
    Resolved(Value),
    /// No identity could be established.
    Anonymous,
}

impl Identity {
    /// JSON value injected into the body; `{}` for anonymous callers.
    pub fn into_value(self) -> Value {
        match self {
            Identity::Resolved(value) => value,
            Identity::Anonymous => Value::Object(Map::new()),
        }
    }
}

/// Whether the request body should be enriched: JSON or undeclared content,
/// sent without a content coding.
pub fn is_enrichable(headers: &HeaderMap) -> bool {
    if is_encoded(headers) {
        return false;
    }
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return true;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };
    let mime = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

// Compressed bodies cannot be parsed or rewritten in place.
fn is_encoded(headers: &HeaderMap) -> bool {
    headers.get_all(header::CONTENT_ENCODING).iter().any(|value| {
        value
            .to_str()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .any(|coding| !coding.is_empty() && !coding.eq_ignore_ascii_case("identity"))
            })
            .unwrap_or(true)
    })
}

/// Raw `Authorization` header value, if present and non-blank.
pub fn auth_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}

/// Parse a request body as a JSON object, falling back to `{}`.
pub fn parse_body(body: &[u8]) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Request body is not a JSON object, replacing with {{}}");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cannot parse request body as JSON, replacing with {{}}");
            Map::new()
        }
    }
}

/// Set `user` on the parsed body and serialize it again.
pub fn inject(body: &[u8], identity: Identity) -> Bytes {
    let mut object = parse_body(body);
    object.insert(USER_FIELD.to_string(), identity.into_value());
    match serde_json::to_vec(&object) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            tracing::error!(error = %e, "Cannot serialize enriched body");
            Bytes::from_static(b"{\"user\":{}}")
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolves identities and injects them into request bodies.
#[derive(Clone)]
pub struct IdentityEnricher {
    provider: Option<Arc<dyn IdentityProvider>>,
}

impl IdentityEnricher {
    /// Enricher backed by `provider`.
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Enricher without an identity service; every caller is anonymous.
    pub fn anonymous() -> Self {
        Self { provider: None }
    }

    /// Resolve the caller identity. Lookup failures degrade to anonymous.
    pub async fn identify(&self, token: Option<&str>) -> Identity {
        let Some(token) = token else {
            return Identity::Anonymous;
        };
        let Some(provider) = &self.provider else {
            tracing::debug!("No identity service configured, caller is anonymous");
            return Identity::Anonymous;
        };

        match provider.lookup(token).await {
            Ok(Some(record)) => {
                metrics::record_identity_lookup("resolved");
                Identity::Resolved(record)
            }
            Ok(None) => {
                metrics::record_identity_lookup("unknown");
                Identity::Anonymous
            }
            Err(e) => {
                metrics::record_identity_lookup("failed");
                tracing::warn!(error = %e, "Identity lookup failed, continuing as anonymous");
                Identity::Anonymous
            }
        }
    }

    /// Identify the caller from `headers` and return the enriched body.
    pub async fn enrich(&self, headers: &HeaderMap, body: &[u8]) -> Bytes {
        let identity = self.identify(auth_token(headers)).await;
        inject(body, identity)
    }
}

impl std::fmt::Debug for IdentityEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityEnricher")
            .field("provider", &self.provider.is_some())
            .finish()
    }
}
