//! Opportunity records as reported by the remote engine.
//!
//! The engine owns price discovery; this side only stores what it reports.
//! Redacted records (pending entitlement) omit their numeric fields, so every
//! estimate is optional.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OpportunityId};
use super::money::Price;

/// Classification of a detected mispricing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityKind {
    /// Outcome prices sum below the payout: buy every outcome.
    LongRebalance,
    /// Outcome prices sum above the payout: sell every outcome.
    ShortRebalance,
    /// Mispricing across logically dependent markets.
    Combinatorial,
    /// No actionable classification (also used for kinds this client does not know).
    #[default]
    #[serde(other)]
    None,
}

/// A detected, potentially time-limited mispricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub opportunity_id: OpportunityId,
    #[serde(default)]
    pub kind: OpportunityKind,
    #[serde(default)]
    pub market_ids: Vec<MarketId>,
    /// Prices observed on the venue, one per referenced outcome.
    #[serde(default)]
    pub market_prices: Vec<Price>,
    /// Prices the engine's model considers fair.
    #[serde(default)]
    pub projected_prices: Vec<Price>,
    /// Estimated profit in percent of capital deployed.
    #[serde(default)]
    pub expected_profit_pct: Option<Decimal>,
    #[serde(default)]
    pub confidence: Option<Decimal>,
    #[serde(default)]
    pub execution_risk: Option<Decimal>,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub redacted: bool,
}

impl Opportunity {
    /// True once `expires_at` is in the past. Opportunities without an expiry
    /// never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Sum of absolute differences between projected and observed prices.
    ///
    /// `None` when either side is hidden or the vectors do not line up.
    #[must_use]
    pub fn price_gap(&self) -> Option<Decimal> {
        if self.market_prices.is_empty() || self.market_prices.len() != self.projected_prices.len()
        {
            return None;
        }
        Some(
            self.market_prices
                .iter()
                .zip(&self.projected_prices)
                .map(|(observed, projected)| (projected - observed).abs())
                .sum(),
        )
    }
}
