//! Opportunity registry bounds and alert policy.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::application::registry::AlertPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Maximum number of opportunities retained.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Profit percentage at or above which an alert fires.
    #[serde(default = "default_alert_threshold_pct")]
    pub alert_threshold_pct: Decimal,
    /// How long an alert stays visible (milliseconds).
    #[serde(default = "default_alert_duration_ms")]
    pub alert_duration_ms: u64,
}

const fn default_capacity() -> usize {
    100
}

fn default_alert_threshold_pct() -> Decimal {
    dec!(10)
}

const fn default_alert_duration_ms() -> u64 {
    300
}

impl RegistryConfig {
    #[must_use]
    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            threshold_pct: self.alert_threshold_pct,
            duration: Duration::from_millis(self.alert_duration_ms),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            alert_threshold_pct: default_alert_threshold_pct(),
            alert_duration_ms: default_alert_duration_ms(),
        }
    }
}
