//! Configuration for the custody ledger

use crate::error::{Error, Result};
use crate::price::{DEFAULT_PRICE_DECIMALS, MAX_PRICE_DECIMALS};
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Decimal scale of the fixed-point price representation
    pub price_decimals: u32,

    /// Metrics listen address (for the host process to serve scrapes)
    pub metrics_listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "custody-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            price_decimals: DEFAULT_PRICE_DECIMALS,
            metrics_listen_addr: "0.0.0.0:9090".to_string(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(decimals) = std::env::var("CUSTODY_PRICE_DECIMALS") {
            config.price_decimals = decimals
                .parse()
                .map_err(|e| Error::Config(format!("Invalid CUSTODY_PRICE_DECIMALS: {}", e)))?;
        }

        if let Ok(addr) = std::env::var("CUSTODY_METRICS_ADDR") {
            config.metrics_listen_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.service_name.is_empty() {
            return Err(Error::Config("service name must not be empty".to_string()));
        }
        if self.price_decimals > MAX_PRICE_DECIMALS {
            return Err(Error::Config(format!(
                "price_decimals {} exceeds maximum {}",
                self.price_decimals, MAX_PRICE_DECIMALS
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "custody-ledger");
        assert_eq!(config.price_decimals, DEFAULT_PRICE_DECIMALS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_oversized_scale() {
        let config = Config {
            price_decimals: MAX_PRICE_DECIMALS + 1,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_service_name() {
        let config = Config {
            service_name: String::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
