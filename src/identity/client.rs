//! Identity service client.
//!
//! Resolves an opaque auth token to the identity record held by the
//! identity service: `GET <base>/v1/users/byToken/<token>/`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Failure to obtain an identity for a token.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid identity service address `{0}`")]
    InvalidAddress(String),

    #[error("identity service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity service returned an unreadable body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Source of caller identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up the identity for `token`.
    ///
    /// `Ok(None)` means the service answered but knows no identity.
    async fn lookup(&self, token: &str) -> Result<Option<Value>, IdentityError>;
}

/// [`IdentityProvider`] backed by the HTTP identity service.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base: Url,
}

impl HttpIdentityProvider {
    /// Create a provider for the service at `base`, bounding each lookup by `timeout`.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, IdentityError> {
        let base = Url::parse(base).map_err(|_| IdentityError::InvalidAddress(base.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(IdentityError::InvalidAddress(base.to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Lookup URL for a token. The token is encoded as a single path segment.
    pub fn lookup_url(&self, token: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1", "users", "byToken", token, ""]);
        }
        url
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn lookup(&self, token: &str) -> Result<Option<Value>, IdentityError> {
        let url = self.lookup_url(token);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(status = %status, bytes = body.len(), "Identity service replied");

        let mut reply: Map<String, Value> = serde_json::from_slice(&body)?;
        Ok(reply.remove("data").filter(|data| !data.is_null()))
    }
}
