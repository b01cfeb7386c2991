//! EVM ledger adapter built on alloy.

pub mod gateway;

pub use gateway::EvmGateway;
