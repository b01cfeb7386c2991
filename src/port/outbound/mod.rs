//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod execution;
pub mod ledger;
pub mod notifier;
pub mod stream;
