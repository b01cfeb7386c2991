//! Handler for the `config` command group.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::{Config, API_TOKEN_ENV, PRIVATE_KEY_ENV};

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    Config::load(path)?;
    output::success("Configuration is valid");
    output::field("Path", path.display());
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    output::section("Stream");
    let mut url = config.stream_url()?;
    url.set_query(None);
    output::field("URL", url);
    output::field("Reconnect", config.stream.auto_reconnect);
    output::field("Interval", format!("{}ms", config.stream.reconnect_interval_ms));
    if let Some(subscription) = &config.stream.subscribe {
        output::field("Markets", subscription.markets.len());
        output::field("Topics", subscription.topics.join(", "));
        if let Some(min_profit) = subscription.min_profit {
            output::field("Min profit", format!("{min_profit}%"));
        }
    }

    output::section("Registry");
    output::field("Capacity", config.registry.capacity);
    output::field("Alert at", format!("{}%", config.registry.alert_threshold_pct));
    output::field("Alert for", format!("{}ms", config.registry.alert_duration_ms));

    output::section("Execution");
    if config.execution.api_url.is_empty() {
        output::field("API", "(not configured)");
    } else {
        output::field("API", &config.execution.api_url);
    }
    output::field("Timeout", format!("{}ms", config.execution.timeout_ms));
    output::field("Max slippage", config.execution.max_slippage);
    output::field("Dry run", config.execution.dry_run);

    output::section("Ledger");
    output::field("RPC", &config.ledger.rpc_url);
    output::field("Token", &config.ledger.settlement_token);
    output::field("Exchange", &config.ledger.exchange_address);
    output::field(
        "Receipts",
        format!(
            "poll {}ms, give up after {}ms",
            config.ledger.receipt_poll_interval_ms, config.ledger.receipt_timeout_ms
        ),
    );

    output::section("Secrets");
    output::field(API_TOKEN_ENV, presence(config.api_token().is_some()));
    output::field(PRIVATE_KEY_ENV, presence(config.ledger.private_key.is_some()));
    Ok(())
}

const fn presence(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "not set"
    }
}
