//! Exchange-agnostic domain types.

pub mod connection;
pub mod id;
pub mod money;
pub mod opportunity;
pub mod trade;

pub use connection::{ConnectionStatus, Link, LinkAction, LinkEvent, Retry, NORMAL_CLOSURE};
pub use id::{MarketId, OpportunityId, TokenId};
pub use money::{Price, TokenAmount, SETTLEMENT_DECIMALS};
pub use opportunity::{Opportunity, OpportunityKind};
pub use trade::{FailureKind, Side, TradeIntent, TradeMarket, TradeOutcome, TradeState};
