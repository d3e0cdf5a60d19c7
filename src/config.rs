//! Service configuration
//!
//! Defaults are suitable for local development; the data directory and
//! bind address can be overridden through `CHAINWATCH_*` environment
//! variables.

use crate::error::{AppError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory for persisted stores
    pub data_dir: PathBuf,
    /// HTTP API bind host
    pub host: String,
    /// HTTP API bind port
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            host: "0.0.0.0".to_string(),
            port: 4000,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("CHAINWATCH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(host) = std::env::var("CHAINWATCH_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("CHAINWATCH_PORT") {
            config.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("Invalid CHAINWATCH_PORT: {}", port)))?;
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Socket address for the HTTP API
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bind_addr() {
        let config = AppConfig::default();
        let addr = config.bind_addr().unwrap();
        assert_eq!(addr.port(), 4000);
    }

    #[test]
    fn test_with_data_dir() {
        let config = AppConfig::default().with_data_dir("/tmp/cw-test");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cw-test"));
    }
}
