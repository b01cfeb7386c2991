//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use std::time::Duration;

use alloy_primitives::Address;
use url::Url;

use crate::application::trade::GuardSettings;
use crate::infrastructure::config::stream::StreamConfig;

pub const SETTLEMENT_TOKEN: Address = Address::repeat_byte(0x01);
pub const EXCHANGE: Address = Address::repeat_byte(0x02);

/// Stream settings with the default 5 s reconnect interval.
pub fn stream(auto_reconnect: bool) -> StreamConfig {
    StreamConfig {
        url: stream_url().to_string(),
        auto_reconnect,
        reconnect_interval_ms: 5000,
        subscribe: None,
    }
}

pub fn stream_url() -> Url {
    Url::parse("wss://engine.test/ws/opportunities").expect("static url")
}

/// Guard settings with fixed addresses and a 2 s simulated delay.
pub fn guard_settings() -> GuardSettings {
    GuardSettings {
        settlement_token: SETTLEMENT_TOKEN,
        exchange: EXCHANGE,
        simulate_delay: Duration::from_secs(2),
    }
}

/// A complete, valid config file.
pub const VALID_TOML: &str = r#"
[stream]
url = "wss://engine.test/ws/opportunities"
reconnect_interval_ms = 5000

[registry]
capacity = 50
alert_threshold_pct = 10

[execution]
api_url = "https://engine.test/api"
max_slippage = 0.02
dry_run = true

[logging]
level = "info"
format = "pretty"
"#;
