use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 1024;
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Server configuration surface. `allowlist` is mandatory input; everything
/// else has a serviceable default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Source addresses admitted by the access filter. Empty denies all.
    pub allowlist: Vec<String>,
    pub bind_addr: String,
    pub bind_port: u16,
    /// Ceiling applied to the whole request lifetime: read, dispatch, write.
    pub request_timeout: Duration,
    /// Maximum simultaneously in-flight requests; excess callers wait.
    pub concurrency_limit: usize,
    pub max_body_bytes: usize,
    /// Gzip response compression, on unless explicitly disabled.
    pub compression: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RPC_ALLOWLIST is required")]
    MissingAllowlist,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("RPC_REQUEST_TIMEOUT_SECS must be a positive integer")]
    InvalidTimeout,
    #[error("RPC_CONCURRENCY_LIMIT must be a positive integer")]
    InvalidConcurrencyLimit,
    #[error("RPC_MAX_BODY_BYTES must be a positive integer")]
    InvalidBodyLimit,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowlist: Vec::new(),
            bind_addr: "127.0.0.1".to_string(),
            bind_port: 8080,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            compression: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let allowlist = env::var("RPC_ALLOWLIST")
            .map_err(|_| ConfigError::MissingAllowlist)?
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
        let bind_port = env::var("BIND_PORT")
            .ok()
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);

        let request_timeout = env::var("RPC_REQUEST_TIMEOUT_SECS")
            .ok()
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidTimeout)
            })
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let concurrency_limit = env::var("RPC_CONCURRENCY_LIMIT")
            .ok()
            .map(|value| {
                value
                    .parse::<usize>()
                    .ok()
                    .filter(|limit| *limit > 0)
                    .ok_or(ConfigError::InvalidConcurrencyLimit)
            })
            .transpose()?
            .unwrap_or(DEFAULT_CONCURRENCY_LIMIT);

        let max_body_bytes = env::var("RPC_MAX_BODY_BYTES")
            .ok()
            .map(|value| {
                value
                    .parse::<usize>()
                    .ok()
                    .filter(|bytes| *bytes > 0)
                    .ok_or(ConfigError::InvalidBodyLimit)
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let compression = env::var("RPC_COMPRESSION")
            .map(|value| !matches!(value.trim(), "0" | "false" | "off"))
            .unwrap_or(true);

        let config = Self {
            allowlist,
            bind_addr,
            bind_port,
            request_timeout,
            concurrency_limit,
            max_body_bytes,
            compression,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
