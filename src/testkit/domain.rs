//! Builders for domain values used across tests.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use crate::domain::id::{MarketId, TokenId};
use crate::domain::opportunity::{Opportunity, OpportunityKind};
use crate::domain::trade::{Side, TradeIntent, TradeMarket};

/// An opportunity detected now, without a profit estimate or expiry.
pub fn opportunity(id: &str) -> Opportunity {
    Opportunity {
        opportunity_id: id.into(),
        kind: OpportunityKind::LongRebalance,
        market_ids: vec![MarketId::from("0xmarket")],
        market_prices: Vec::new(),
        projected_prices: Vec::new(),
        expected_profit_pct: None,
        confidence: None,
        execution_risk: None,
        detected_at: Utc::now(),
        expires_at: None,
        redacted: false,
    }
}

pub fn opportunity_with_profit(id: &str, profit_pct: Decimal) -> Opportunity {
    Opportunity {
        expected_profit_pct: Some(profit_pct),
        ..opportunity(id)
    }
}

/// The wire form of an `opportunity` frame.
pub fn opportunity_frame(id: &str, profit_pct: &str, sequence: u64) -> serde_json::Value {
    json!({
        "type": "opportunity",
        "payload": {
            "opportunity_id": id,
            "kind": "long_rebalance",
            "market_ids": ["0xmarket"],
            "expected_profit_pct": profit_pct,
            "detected_at": "2026-01-01T00:00:00Z",
        },
        "timestamp": "2026-01-01T00:00:00Z",
        "sequence": sequence,
    })
}

pub fn heartbeat_frame(authenticated: bool, sequence: u64) -> serde_json::Value {
    json!({
        "type": "heartbeat",
        "payload": { "authenticated": authenticated, "tier": "pro" },
        "sequence": sequence,
    })
}

pub fn error_frame(message: &str, sequence: u64) -> serde_json::Value {
    json!({
        "type": "error",
        "payload": { "message": message },
        "sequence": sequence,
    })
}

pub fn trade_market() -> TradeMarket {
    TradeMarket {
        market_id: MarketId::from("0xmarket"),
        yes_token: TokenId::from("1001"),
        no_token: TokenId::from("1002"),
    }
}

/// A YES buy of `amount_usd`. Panics for amounts the intent rejects.
pub fn trade_intent(amount_usd: Decimal) -> TradeIntent {
    TradeIntent::new(trade_market(), Side::Yes, amount_usd).expect("valid test amount")
}
