//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; secrets come only from the
//! environment (`ARBWATCH_API_TOKEN`, `WALLET_PRIVATE_KEY`).
//!
//! # Example
//!
//! ```no_run
//! use arbwatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

use super::execution::ExecutionConfig;
use super::ledger::LedgerConfig;
use super::logging::LoggingConfig;
use super::registry::RegistryConfig;
use super::stream::StreamConfig;
use crate::error::{ConfigError, Result};

/// Environment variable holding the stream credential and REST bearer token.
pub const API_TOKEN_ENV: &str = "ARBWATCH_API_TOKEN";

/// Environment variable holding the hex-encoded signing key.
pub const PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub registry: RegistryConfig,

    #[serde(default)]
    pub execution: ExecutionConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse configuration from TOML content and pull secrets from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        config.execution.api_token = non_empty_env(API_TOKEN_ENV);
        config.ledger.private_key = non_empty_env(PRIVATE_KEY_ENV);

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Credential appended to the stream URL and used as REST bearer token.
    #[must_use]
    pub fn api_token(&self) -> Option<&str> {
        self.execution.api_token.as_deref()
    }

    /// Parsed stream endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is missing or malformed.
    #[allow(clippy::result_large_err)]
    pub fn stream_url(&self) -> Result<Url> {
        parse_url("stream.url", &self.stream.url, &["ws", "wss"])
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        self.stream_url()?;
        if self.stream.reconnect_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stream.reconnect_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.registry.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "registry.capacity",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.registry.alert_threshold_pct < Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "registry.alert_threshold_pct",
                reason: "must be 0 or greater".to_string(),
            }
            .into());
        }

        if !self.execution.api_url.is_empty() {
            parse_url("execution.api_url", &self.execution.api_url, &["http", "https"])?;
        }
        if self.execution.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "execution.timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.execution.max_slippage < Decimal::ZERO || self.execution.max_slippage > Decimal::ONE
        {
            return Err(ConfigError::InvalidValue {
                field: "execution.max_slippage",
                reason: "must be between 0 and 1".to_string(),
            }
            .into());
        }

        parse_url("ledger.rpc_url", &self.ledger.rpc_url, &["http", "https"])?;
        self.ledger.settlement_token_address()?;
        self.ledger.exchange_contract_address()?;
        if self.ledger.receipt_poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ledger.receipt_poll_interval_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.ledger.receipt_timeout_ms < self.ledger.receipt_poll_interval_ms {
            return Err(ConfigError::InvalidValue {
                field: "ledger.receipt_timeout_ms",
                reason: "must be >= receipt_poll_interval_ms".to_string(),
            }
            .into());
        }

        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!(
                    "unknown format '{}' (expected pretty or json)",
                    self.logging.format
                ),
            }
            .into());
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[allow(clippy::result_large_err)]
fn parse_url(field: &'static str, value: &str, schemes: &[&str]) -> Result<Url> {
    if value.is_empty() {
        return Err(ConfigError::MissingField { field }.into());
    }
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("scheme must be one of {}", schemes.join(", ")),
        }
        .into());
    }
    Ok(url)
}
