//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Suffix of the environment variables that carry backend hosts.
pub const SERVICE_ADDRESS_SUFFIX: &str = "_service_address";

/// Service key whose address doubles as the identity service base.
pub const IDENTITY_SERVICE_KEY: &str = "user";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read a TOML file into a configuration. Missing sections take defaults.
pub fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay `<service>_service_address` variables onto the config.
///
/// `user_service_address` also becomes the identity service address.
pub fn apply_env<I, K, V>(config: &mut GatewayConfig, vars: I)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    for (key, value) in vars {
        let Some(service) = key.as_ref().strip_suffix(SERVICE_ADDRESS_SUFFIX) else {
            continue;
        };
        if service.is_empty() {
            continue;
        }
        let value = value.into();
        if service == IDENTITY_SERVICE_KEY {
            config.identity.address = Some(value.clone());
        }
        config.services.insert(service.to_string(), value);
    }
}

/// Load, overlay and validate the configuration.
///
/// Order: defaults, then the optional file, then `vars`.
pub fn load_config<I, K, V>(path: Option<&Path>, vars: I) -> Result<GatewayConfig, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => GatewayConfig::default(),
    };
    apply_env(&mut config, vars);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn env_vars_populate_services_and_identity() {
        let vars = vec![
            ("user_service_address", "users:8000"),
            ("event_service_address", "events:8001"),
            ("PATH", "/usr/bin"),
            ("_service_address", "ignored"),
        ];
        let config = load_config(None, vars).unwrap();

        assert_eq!(config.service_host("user"), Some("users:8000"));
        assert_eq!(config.service_host("event"), Some("events:8001"));
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.identity.address.as_deref(), Some("users:8000"));
    }

    #[test]
    fn env_overrides_file() {
        let path = std::env::temp_dir().join(format!("gateway-{}.toml", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "routes = [\"user\", \"orders\"]\n[services]\nuser = \"file-host:1\"\norders = \"orders:2\""
        )
        .unwrap();

        let config = load_config(Some(path.as_path()), [("user_service_address", "env-host:1")]).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.routes, vec!["user".to_string(), "orders".to_string()]);
        assert_eq!(config.service_host("user"), Some("env-host:1"));
        assert_eq!(config.service_host("orders"), Some("orders:2"));
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("gateway-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "routes = 7").unwrap();

        let err = load_config(Some(path.as_path()), Vec::<(String, String)>::new()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_errors_are_reported_together() {
        let path = std::env::temp_dir().join(format!("gateway-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "routes = [\"\"]\n[timeouts]\nconnect_secs = 0").unwrap();

        let err = load_config(Some(path.as_path()), Vec::<(String, String)>::new()).unwrap_err();
        fs::remove_file(&path).ok();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
