//! Gateway configuration with validation.

use chainhook_reporter::ConfigError;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Default request body limit (5 MiB); chainhook deliveries carry whole blocks.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Main gateway configuration
#[derive(Clone)]
pub struct GatewayConfig {
    /// Bind address
    pub host: IpAddr,
    /// Bind port
    pub port: u16,
    /// Shared secret required on `POST /chainhook` (None = check disabled)
    pub webhook_secret: Option<String>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
    /// Logging configuration
    pub log: LogConfig,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log", &self.log)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            webhook_secret: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log: LogConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CHAINHOOK_SERVER_HOST`: bind address (default: 0.0.0.0)
    /// - `CHAINHOOK_SERVER_PORT`: bind port (default: 3000)
    /// - `CHAINHOOK_WEBHOOK_SECRET`: shared secret for `POST /chainhook`
    /// - `CHAINHOOK_MAX_BODY_BYTES`: request body limit (default: 5 MiB)
    /// - `REPORTER_LOG_LEVEL`: log filter (default: info)
    /// - `REPORTER_JSON_LOGS`: JSON log output (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = match var("CHAINHOOK_SERVER_HOST") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CHAINHOOK_SERVER_HOST",
                reason: format!("{raw:?} is not an IP address"),
            })?,
            None => defaults.host,
        };

        let port = match var("CHAINHOOK_SERVER_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CHAINHOOK_SERVER_PORT",
                reason: format!("{raw:?} is not a port number"),
            })?,
            None => defaults.port,
        };

        let max_body_bytes = match var("CHAINHOOK_MAX_BODY_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CHAINHOOK_MAX_BODY_BYTES",
                reason: format!("{raw:?} is not a byte count"),
            })?,
            None => defaults.max_body_bytes,
        };

        let json = match var("REPORTER_JSON_LOGS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid {
                name: "REPORTER_JSON_LOGS",
                reason: format!("{raw:?} is not a boolean"),
            })?,
            None => defaults.log.json,
        };

        let config = Self {
            host,
            port,
            webhook_secret: var("CHAINHOOK_WEBHOOK_SECRET"),
            max_body_bytes,
            log: LogConfig {
                level: var("REPORTER_LOG_LEVEL").unwrap_or(defaults.log.level),
                json,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid {
                name: "CHAINHOOK_MAX_BODY_BYTES",
                reason: "cannot be 0".into(),
            });
        }
        Ok(())
    }

    /// Get HTTP socket address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
