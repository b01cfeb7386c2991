//! Trade intents, guard states and outcomes.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MarketId, TokenId};
use super::money::TokenAmount;

/// One of the two mutually exclusive outcomes of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => f.write_str("yes"),
            Self::No => f.write_str("no"),
        }
    }
}

/// The market a trade targets, with the outcome token for each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeMarket {
    pub market_id: MarketId,
    pub yes_token: TokenId,
    pub no_token: TokenId,
}

impl TradeMarket {
    #[must_use]
    pub fn token_for(&self, side: Side) -> &TokenId {
        match side {
            Side::Yes => &self.yes_token,
            Side::No => &self.no_token,
        }
    }
}

/// A user-authorized request to buy one side of a market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeIntent {
    pub market: TradeMarket,
    pub side: Side,
    /// Notional in settlement-token base units.
    pub amount: TokenAmount,
}

impl TradeIntent {
    /// Build an intent from a human-readable dollar amount.
    ///
    /// Returns `None` when the amount is negative, zero after truncation to
    /// base units, or out of range.
    #[must_use]
    pub fn new(market: TradeMarket, side: Side, amount_usd: Decimal) -> Option<Self> {
        let amount = TokenAmount::from_decimal(amount_usd).filter(|a| !a.is_zero())?;
        Some(Self {
            market,
            side,
            amount,
        })
    }

    #[must_use]
    pub fn token(&self) -> &TokenId {
        self.market.token_for(self.side)
    }
}

/// Observable sub-states of the trade guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TradeState {
    #[default]
    Idle,
    CheckingBalance,
    InsufficientBalance,
    CheckingAllowance,
    Approving,
    WaitingApproval,
    Trading,
    WaitingTrade,
    Success,
    Error,
}

impl TradeState {
    /// True while an attempt is between its first read and a terminal state.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::CheckingBalance
                | Self::CheckingAllowance
                | Self::Approving
                | Self::WaitingApproval
                | Self::Trading
                | Self::WaitingTrade
        )
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::InsufficientBalance | Self::Success | Self::Error)
    }
}

impl fmt::Display for TradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::CheckingBalance => "checking-balance",
            Self::InsufficientBalance => "insufficient-balance",
            Self::CheckingAllowance => "checking-allowance",
            Self::Approving => "approving",
            Self::WaitingApproval => "waiting-approval",
            Self::Trading => "trading",
            Self::WaitingTrade => "waiting-trade",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// User-facing category of an on-chain failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    UserRejected,
    InsufficientFunds,
    SlippageExceeded,
    Other,
}

impl FailureKind {
    /// Categorize a raw provider or RPC error message.
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let msg = raw.to_ascii_lowercase();
        if msg.contains("user rejected")
            || msg.contains("user denied")
            || msg.contains("rejected the request")
            || msg.contains("code 4001")
            || msg.contains("\"code\":4001")
        {
            Self::UserRejected
        } else if msg.contains("insufficient funds")
            || msg.contains("gas required exceeds")
            || msg.contains("exceeds balance")
            || msg.contains("out of gas")
        {
            Self::InsufficientFunds
        } else if msg.contains("slippage")
            || msg.contains("too little received")
            || msg.contains("price moved")
        {
            Self::SlippageExceeded
        } else {
            Self::Other
        }
    }

    /// Human-readable message for this category.
    #[must_use]
    pub fn message(&self, raw: &str) -> String {
        match self {
            Self::UserRejected => "Transaction rejected in wallet".to_string(),
            Self::InsufficientFunds => "Insufficient funds for transaction or gas".to_string(),
            Self::SlippageExceeded => "Price moved beyond slippage tolerance".to_string(),
            Self::Other => format!("Transaction failed: {raw}"),
        }
    }
}

/// Terminal result of one trade-guard attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeOutcome {
    /// The trade was confirmed on-chain.
    Success {
        tx_hash: String,
        /// Set when an approval had to be mined first.
        approval_tx_hash: Option<String>,
    },
    /// The simulated path completed without touching the chain.
    Simulated,
    /// Balance was below the requested amount; nothing was written.
    InsufficientBalance {
        required: TokenAmount,
        available: TokenAmount,
        shortfall: TokenAmount,
    },
    /// A step failed; `message` is already normalized for display.
    Failed {
        state: TradeState,
        kind: FailureKind,
        message: String,
    },
}

impl TradeOutcome {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Success { tx_hash, .. } => format!("Trade confirmed ({tx_hash})"),
            Self::Simulated => "Simulated trade completed".to_string(),
            Self::InsufficientBalance {
                shortfall,
                available,
                ..
            } => format!("Insufficient balance: ${available} available, ${shortfall} short"),
            Self::Failed { message, .. } => message.clone(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Simulated)
    }
}
