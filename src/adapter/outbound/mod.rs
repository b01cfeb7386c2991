//! Outbound adapters (driven side).

#[cfg(feature = "evm")]
pub mod evm;
pub mod http;
pub mod notifier;
pub mod websocket;
