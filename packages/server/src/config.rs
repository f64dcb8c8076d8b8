//! Service configuration, populated from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration for the editor service.
///
/// All fields are populated from environment variables with sensible
/// defaults, so the service can be started with zero configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `APIGRAPH_BIND` | `0.0.0.0:3000` | TCP socket address to listen on |
/// | `APIGRAPH_DB` | (absent = in-memory) | Path to the SQLite database file |
/// | `APIGRAPH_VALIDATION_DELAY_MS` | `300` | Debounce delay before a validation run |
/// | `APIGRAPH_VALIDATE_ON_LOAD` | `true` | Validate the restored workspace at startup |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database file.
    /// `None` means use an in-memory store (the workspace is lost on restart).
    pub db_path: Option<String>,

    /// How long a scheduled validation run waits before starting. A newer
    /// schedule within this window supersedes it.
    pub validation_delay: Duration,

    /// Whether to schedule a validation run right after the workspace is
    /// restored, so issues are available before the first edit.
    pub validate_on_load: bool,
}

/// Error produced when an environment variable holds an unusable value.
#[derive(Debug, thiserror::Error)]
#[error("{var} is invalid: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            db_path: None,
            validation_delay: Duration::from_millis(300),
            validate_on_load: true,
        }
    }
}

impl ServerConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Populate config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = match lookup("APIGRAPH_BIND") {
            Some(v) => v.parse().map_err(|e| ConfigError {
                var: "APIGRAPH_BIND",
                reason: format!("{e} (expected a socket address such as 0.0.0.0:3000)"),
            })?,
            None => defaults.bind_addr,
        };

        let validation_delay = match lookup("APIGRAPH_VALIDATION_DELAY_MS") {
            Some(v) => Duration::from_millis(v.trim().parse::<u64>().map_err(|e| ConfigError {
                var: "APIGRAPH_VALIDATION_DELAY_MS",
                reason: e.to_string(),
            })?),
            None => defaults.validation_delay,
        };

        let validate_on_load = match lookup("APIGRAPH_VALIDATE_ON_LOAD") {
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError {
                var: "APIGRAPH_VALIDATE_ON_LOAD",
                reason: format!("{v:?} is not a boolean"),
            })?,
            None => defaults.validate_on_load,
        };

        Ok(Self {
            bind_addr,
            db_path: lookup("APIGRAPH_DB").filter(|p| !p.trim().is_empty()),
            validation_delay,
            validate_on_load,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
