//! Bounded, deduplicated store of observed opportunities.
//!
//! Records are kept most-recent-first by first arrival. An update for a known
//! id replaces the record where it sits, so a chatty opportunity does not jump
//! the queue or push others out.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::domain::id::OpportunityId;
use crate::domain::opportunity::Opportunity;
use crate::port::Alert;

pub const DEFAULT_CAPACITY: usize = 100;

/// When an upsert should raise a high-profit alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    /// Minimum `expected_profit_pct`, inclusive.
    pub threshold_pct: Decimal,
    /// How long the alert stays visible.
    pub duration: Duration,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            threshold_pct: dec!(10),
            duration: Duration::from_millis(300),
        }
    }
}

impl AlertPolicy {
    fn check(&self, opportunity: &Opportunity) -> Option<Alert> {
        let profit = opportunity.expected_profit_pct?;
        (profit >= self.threshold_pct).then(|| Alert {
            opportunity_id: opportunity.opportunity_id.clone(),
            profit_pct: profit,
            duration: self.duration,
        })
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    /// False when an existing record was replaced.
    pub inserted: bool,
    /// Ids dropped to stay within capacity.
    pub evicted: Vec<OpportunityId>,
    pub alert: Option<Alert>,
}

#[derive(Debug, Clone)]
pub struct OpportunityRegistry {
    entries: VecDeque<Opportunity>,
    capacity: usize,
    policy: AlertPolicy,
}

impl OpportunityRegistry {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize, policy: AlertPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            policy,
        }
    }

    /// Insert or replace an opportunity.
    pub fn upsert(&mut self, opportunity: Opportunity) -> Upserted {
        let alert = self.policy.check(&opportunity);

        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|o| o.opportunity_id == opportunity.opportunity_id)
        {
            *slot = opportunity;
            return Upserted {
                inserted: false,
                evicted: Vec::new(),
                alert,
            };
        }

        self.entries.push_front(opportunity);
        let evicted: Vec<OpportunityId> = if self.entries.len() > self.capacity {
            self.entries
                .drain(self.capacity..)
                .map(|o| o.opportunity_id)
                .collect()
        } else {
            Vec::new()
        };
        if !evicted.is_empty() {
            debug!(count = evicted.len(), "Evicted oldest opportunities");
        }

        Upserted {
            inserted: true,
            evicted,
            alert,
        }
    }

    #[must_use]
    pub fn get(&self, id: &OpportunityId) -> Option<&Opportunity> {
        self.entries.iter().find(|o| &o.opportunity_id == id)
    }

    /// Most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &Opportunity> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The `n` most profitable opportunities with a known profit estimate.
    /// Ties keep arrival order.
    #[must_use]
    pub fn top_by_profit(&self, n: usize) -> Vec<&Opportunity> {
        let mut ranked: Vec<&Opportunity> = self
            .entries
            .iter()
            .filter(|o| o.expected_profit_pct.is_some())
            .collect();
        ranked.sort_by(|a, b| b.expected_profit_pct.cmp(&a.expected_profit_pct));
        ranked.truncate(n);
        ranked
    }

    /// Drop expired opportunities, returning how many were removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|o| !o.is_expired(now));
        before - self.entries.len()
    }
}

impl Default for OpportunityRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, AlertPolicy::default())
    }
}
