//! Opportunity stream connection settings.

use std::time::Duration;

use serde::Deserialize;

use crate::port::Subscription;

/// Settings for the streaming connection and its reconnection policy.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// WebSocket endpoint, e.g. `wss://engine.example/ws/opportunities`.
    #[serde(default)]
    pub url: String,
    /// Reconnect after an abnormal close or a failed open.
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,
    /// Fixed delay between reconnection attempts (milliseconds).
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Filter sent after every successful open.
    #[serde(default)]
    pub subscribe: Option<Subscription>,
}

const fn default_auto_reconnect() -> bool {
    true
}

const fn default_reconnect_interval_ms() -> u64 {
    5000
}

impl StreamConfig {
    #[must_use]
    pub const fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auto_reconnect: default_auto_reconnect(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            subscribe: None,
        }
    }
}
