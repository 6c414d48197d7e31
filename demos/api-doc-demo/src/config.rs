//! Demo configuration from `APIDOC_*` environment variables

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Prefix of every configuration variable
pub const ENV_PREFIX: &str = "APIDOC_";

/// Error loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is present but cannot be deserialized
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),
}

/// Demo server configuration
///
/// | Variable | Default |
/// |---|---|
/// | `APIDOC_HOST` | `127.0.0.1` |
/// | `APIDOC_PORT` | `8080` |
/// | `APIDOC_LOG` | `info,apidoc=debug` |
/// | `APIDOC_ANNOTATIONS` | `<executable>.annotations.json` next to the binary |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log")]
    pub log: String,
    #[serde(default)]
    pub annotations: Option<PathBuf>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log() -> String {
    "info,apidoc=debug".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log: default_log(),
            annotations: None,
        }
    }
}

impl DemoConfig {
    /// Load `.env` if present, then read the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(envy::prefixed(ENV_PREFIX).from_env()?)
    }

    /// Read the configuration from explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    /// Bind address, `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = DemoConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_prefixed_overrides() {
        let config = DemoConfig::from_vars(vars(&[
            ("APIDOC_HOST", "0.0.0.0"),
            ("APIDOC_PORT", "9000"),
            ("APIDOC_ANNOTATIONS", "/etc/demo.annotations.json"),
            ("PORT", "1"),
        ]))
        .unwrap();

        assert_eq!(config.address(), "0.0.0.0:9000");
        assert_eq!(
            config.annotations,
            Some(PathBuf::from("/etc/demo.annotations.json"))
        );
    }

    #[test]
    fn test_invalid_port() {
        let err = DemoConfig::from_vars(vars(&[("APIDOC_PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().starts_with("configuration error"));
    }
}
