//! REST execution endpoint settings.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionConfig {
    /// Base URL; requests go to `{api_url}/arbitrage/execute`.
    #[serde(default)]
    pub api_url: String,
    /// Request timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Default slippage tolerance, a fraction in `[0, 1]`.
    #[serde(default = "default_max_slippage")]
    pub max_slippage: Decimal,
    /// Ask the engine to validate without placing orders.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    /// Bearer token, loaded from `ARBWATCH_API_TOKEN`. Never read from the file.
    #[serde(skip)]
    pub api_token: Option<String>,
}

const fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_slippage() -> Decimal {
    dec!(0.02)
}

const fn default_dry_run() -> bool {
    true
}

impl ExecutionConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            timeout_ms: default_timeout_ms(),
            max_slippage: default_max_slippage(),
            dry_run: default_dry_run(),
            api_token: None,
        }
    }
}
