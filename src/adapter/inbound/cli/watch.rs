//! Handler for the `watch` command.

use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::adapter::inbound::cli::command::WatchArgs;
use crate::adapter::inbound::cli::{load_config, output};
use crate::application::registry::OpportunityRegistry;
use crate::application::stream::StreamUpdate;
use crate::domain::connection::ConnectionStatus;
use crate::domain::id::MarketId;
use crate::domain::opportunity::{Opportunity, OpportunityKind};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::port::{Alert, Subscription};

const PRUNE_INTERVAL: Duration = Duration::from_secs(30);

/// Execute the watch command. Runs until Ctrl-C, the `--limit` is reached,
/// or the stream goes down with reconnection disabled.
pub async fn execute(args: &WatchArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let mut client = bootstrap::build_stream_client(&config)?;

    if args.has_filter() {
        client
            .subscribe(Subscription {
                markets: args.markets.iter().cloned().map(MarketId::from).collect(),
                topics: args.topics.clone(),
                min_profit: args.min_profit,
            })
            .await?;
    }

    output::header(env!("CARGO_PKG_VERSION"));
    let mut shown = config.stream_url()?;
    shown.set_query(None);
    output::field("Stream", shown);
    output::field(
        "Reconnect",
        if config.stream.auto_reconnect {
            format!("every {}ms", config.stream.reconnect_interval_ms)
        } else {
            "off".to_string()
        },
    );
    output::field("Alerts", format!("≥ {}%", config.registry.alert_threshold_pct));
    if config.api_token().is_none() {
        output::hint("set ARBWATCH_API_TOKEN to receive unredacted opportunities");
    }

    client.connect(config.api_token().map(str::to_owned)).await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut prune = interval(PRUNE_INTERVAL);
    prune.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut received = 0usize;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = prune.tick() => {
                let removed = client.registry_mut().prune_expired(Utc::now());
                if removed > 0 && output::verbosity() > 0 {
                    output::info(&timestamp(), "pruned", &format!("{removed} expired"));
                }
            }
            update = client.step() => {
                let Some(update) = update else {
                    output::warning("Stream closed and reconnection is disabled");
                    break;
                };
                if let StreamUpdate::Opportunity { inserted: true, .. } = &update {
                    received += 1;
                }
                report(&update, client.registry(), client.error());
                if args.limit.is_some_and(|limit| received >= limit) {
                    break;
                }
            }
        }
    }

    client.disconnect().await;
    print_top(client.registry(), args.top);
    Ok(())
}

fn report(update: &StreamUpdate, registry: &OpportunityRegistry, error: Option<&str>) {
    let ts = timestamp();
    match update {
        StreamUpdate::Connection(status) => {
            let message = match (status, error) {
                (ConnectionStatus::Error, Some(reason)) => format!("{status}: {reason}"),
                _ => status.to_string(),
            };
            output::info(&ts, "connection", &message);
        }
        StreamUpdate::Opportunity {
            opportunity_id,
            alert,
            ..
        } => {
            if let Some(opportunity) = registry.get(opportunity_id) {
                output::opportunity(&ts, &describe(opportunity));
            }
            if let Some(alert) = alert {
                output::alert(&ts, &describe_alert(alert));
            }
        }
        StreamUpdate::Heartbeat { tier } => {
            if output::verbosity() > 0 {
                output::info(&ts, "heartbeat", tier.as_deref().unwrap_or("-"));
            }
        }
        StreamUpdate::ServerError(message) => output::warning(&format!("Server error: {message}")),
        StreamUpdate::Forwarded | StreamUpdate::Idle => {}
    }
}

fn timestamp() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}

const fn kind_label(kind: OpportunityKind) -> &'static str {
    match kind {
        OpportunityKind::None => "none",
        OpportunityKind::LongRebalance => "long_rebalance",
        OpportunityKind::ShortRebalance => "short_rebalance",
        OpportunityKind::Combinatorial => "combinatorial",
    }
}

fn profit_label(opportunity: &Opportunity) -> String {
    match opportunity.expected_profit_pct {
        Some(pct) => output::positive(format!("{}%", pct.round_dp(2))),
        None if opportunity.redacted => "redacted".to_string(),
        None => "-".to_string(),
    }
}

fn describe(opportunity: &Opportunity) -> String {
    let mut line = format!(
        "{} {} {} markets={}",
        output::highlight(&opportunity.opportunity_id),
        kind_label(opportunity.kind),
        profit_label(opportunity),
        opportunity.market_ids.len()
    );
    if let Some(gap) = opportunity.price_gap() {
        line.push_str(&format!(" gap={}", gap.round_dp(4)));
    }
    line
}

fn describe_alert(alert: &Alert) -> String {
    format!(
        "{} at {}% (shown for {}ms)",
        alert.opportunity_id,
        alert.profit_pct.round_dp(2),
        alert.duration.as_millis()
    )
}

fn print_top(registry: &OpportunityRegistry, n: usize) {
    if n == 0 {
        return;
    }
    output::section("Top opportunities");
    let top = registry.top_by_profit(n);
    if top.is_empty() {
        output::note("(none received)");
        return;
    }

    let widths = [24, 16, 10, 8];
    output::table_header(&[
        ("ID", widths[0]),
        ("KIND", widths[1]),
        ("PROFIT", widths[2]),
        ("MARKETS", widths[3]),
    ]);
    for opportunity in top {
        let cells = vec![
            opportunity.opportunity_id.to_string(),
            kind_label(opportunity.kind).to_string(),
            opportunity
                .expected_profit_pct
                .map_or_else(|| "-".to_string(), |pct| format!("{}%", pct.round_dp(2))),
            opportunity.market_ids.len().to_string(),
        ];
        output::table_row(&cells, &widths);
    }
    output::field("Stored", registry.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{opportunity, opportunity_with_profit};
    use rust_decimal_macros::dec;

    #[test]
    fn profit_label_marks_redacted_records() {
        let mut opp = opportunity("hidden");
        opp.expected_profit_pct = None;
        opp.redacted = true;
        assert_eq!(profit_label(&opp), "redacted");
    }

    #[test]
    fn describe_mentions_id_and_kind() {
        let opp = opportunity_with_profit("opp-7", dec!(3.456));
        let line = describe(&opp);
        assert!(line.contains("opp-7"));
        assert!(line.contains("3.46%"));
    }

    #[test]
    fn describe_shows_price_gap_only_when_prices_line_up() {
        let mut opp = opportunity_with_profit("opp-8", dec!(1));
        opp.market_prices = vec![dec!(0.45), dec!(0.50)];
        opp.projected_prices = vec![dec!(0.50), dec!(0.50)];
        assert!(describe(&opp).contains("gap=0.05"));

        opp.projected_prices.pop();
        assert!(!describe(&opp).contains("gap="));
    }
}
