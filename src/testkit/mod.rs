//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stream`]: [`ScriptedTransport`](stream::ScriptedTransport), a scripted
//!   [`StreamTransport`](crate::port::StreamTransport) with a shared recorder.
//! - [`ledger`]: [`FakeLedger`](ledger::FakeLedger), an in-memory
//!   [`ContractGateway`](crate::port::ContractGateway).
//! - [`execution`]: [`RecordingExecutionApi`](execution::RecordingExecutionApi).
//! - [`notifier`]: [`RecordingNotifier`](notifier::RecordingNotifier).
//! - [`domain`]: Builders for opportunities, markets and trade intents.
//! - [`config`]: Canonical test configurations.

pub mod config;
pub mod domain;
pub mod execution;
pub mod ledger;
pub mod notifier;
pub mod stream;
