//! On-chain ledger settings for the trade guard.

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use serde::Deserialize;

use crate::error::ConfigError;

/// Native USDC on Polygon mainnet.
pub const DEFAULT_SETTLEMENT_TOKEN: &str = "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359";

/// Polymarket CTF exchange.
pub const DEFAULT_EXCHANGE_ADDRESS: &str = "0x4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E";

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// ERC-20 settlement token address.
    #[serde(default = "default_settlement_token")]
    pub settlement_token: String,
    /// Exchange contract that receives the allowance and executes buys.
    #[serde(default = "default_exchange_address")]
    pub exchange_address: String,
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    /// Give up waiting for a receipt after this long (milliseconds).
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
    /// Delay of the simulated trade path (milliseconds).
    #[serde(default = "default_simulate_delay_ms")]
    pub simulate_delay_ms: u64,
    /// Signing key, loaded from `WALLET_PRIVATE_KEY`. Never read from the file.
    #[serde(skip)]
    pub private_key: Option<String>,
}

fn default_rpc_url() -> String {
    "https://polygon-rpc.com".into()
}

fn default_settlement_token() -> String {
    DEFAULT_SETTLEMENT_TOKEN.into()
}

fn default_exchange_address() -> String {
    DEFAULT_EXCHANGE_ADDRESS.into()
}

const fn default_receipt_poll_interval_ms() -> u64 {
    2000
}

const fn default_receipt_timeout_ms() -> u64 {
    120_000
}

const fn default_simulate_delay_ms() -> u64 {
    2000
}

impl LedgerConfig {
    /// Parsed settlement token address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed address.
    pub fn settlement_token_address(&self) -> Result<Address, ConfigError> {
        parse_address("ledger.settlement_token", &self.settlement_token)
    }

    /// Parsed exchange contract address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed address.
    pub fn exchange_contract_address(&self) -> Result<Address, ConfigError> {
        parse_address("ledger.exchange_address", &self.exchange_address)
    }

    #[must_use]
    pub const fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    #[must_use]
    pub const fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }

    #[must_use]
    pub const fn simulate_delay(&self) -> Duration {
        Duration::from_millis(self.simulate_delay_ms)
    }
}

fn parse_address(field: &'static str, value: &str) -> Result<Address, ConfigError> {
    Address::from_str(value).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            settlement_token: default_settlement_token(),
            exchange_address: default_exchange_address(),
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            receipt_timeout_ms: default_receipt_timeout_ms(),
            simulate_delay_ms: default_simulate_delay_ms(),
            private_key: None,
        }
    }
}
