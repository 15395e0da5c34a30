//! Server configuration module
//! Handles listen address and transport limits for the relay

use crate::constants::{DEFAULT_HOST, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_PORT};
use crate::error::{RelayError, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Server configuration parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest inbound WebSocket frame accepted, in bytes
    pub max_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| {
            RelayError::ConfigError(format!("{} has an invalid value: '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

impl ServerConfig {
    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("RELAY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_var("RELAY_PORT", lookup("RELAY_PORT"), DEFAULT_PORT)?;
        let max_message_size = parse_var(
            "RELAY_MAX_MESSAGE_SIZE",
            lookup("RELAY_MAX_MESSAGE_SIZE"),
            DEFAULT_MAX_MESSAGE_SIZE,
        )?;

        let config = Self {
            host,
            port,
            max_message_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RelayError::ConfigError("host must not be empty".to_string()));
        }
        if self.max_message_size == 0 {
            return Err(RelayError::ConfigError(
                "max message size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| RelayError::ConfigError(format!("invalid listen address: {}", e)))
    }
}
