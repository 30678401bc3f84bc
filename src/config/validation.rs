//! Configuration validation.
//!
//! Semantic checks only; serde handles the syntax. Returns every error
//! found, not just the first, and runs before the config is accepted.

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route key must not be empty")]
    EmptyRoute,

    #[error("route key `{0}` must not contain '/'")]
    RouteContainsSlash(String),

    #[error("route key `{0}` is registered more than once")]
    DuplicateRoute(String),

    #[error("timeout `{0}` must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("identity address `{0}` is not a valid URL")]
    InvalidIdentityAddress(String),

    #[error("metrics address `{0}` is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration: `GatewayConfig → Result<(), Vec<ValidationError>>`.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for route in &config.routes {
        if route.is_empty() {
            errors.push(ValidationError::EmptyRoute);
        } else if route.contains('/') {
            errors.push(ValidationError::RouteContainsSlash(route.clone()));
        } else if !seen.insert(route.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.clone()));
        }
    }

    let timeouts = [
        ("connect_secs", config.timeouts.connect_secs),
        ("upstream_secs", config.timeouts.upstream_secs),
        ("request_secs", config.timeouts.request_secs),
        ("identity.timeout_secs", config.identity.timeout_secs),
    ];
    for (name, value) in timeouts {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if let Some(base) = config.identity.base_url() {
        if Url::parse(&base).is_err() {
            errors.push(ValidationError::InvalidIdentityAddress(base));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.routes = vec!["".into(), "a/b".into(), "user".into(), "user".into()];
        config.timeouts.upstream_secs = 0;
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyRoute,
                ValidationError::RouteContainsSlash("a/b".into()),
                ValidationError::DuplicateRoute("user".into()),
                ValidationError::ZeroTimeout("upstream_secs"),
                ValidationError::InvalidMetricsAddress("nowhere".into()),
            ]
        );
    }

    #[test]
    fn rejects_unparsable_identity_address() {
        let mut config = GatewayConfig::default();
        config.identity.address = Some("http://exa mple".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidIdentityAddress(_)));
    }
}
