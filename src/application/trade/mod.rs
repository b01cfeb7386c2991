//! Guarded on-chain trading.

pub mod guard;

pub use guard::{Balances, GuardSettings, TradeGuard};
