//! Arbwatch - live arbitrage opportunity client and guarded executor.
//!
//! A remote engine detects mispricings across prediction markets and pushes
//! them over a WebSocket. This crate consumes that stream, keeps a bounded
//! registry of what it has seen, and lets a human act on an opportunity in
//! one of two ways: a guarded on-chain buy, or a request to the engine's REST
//! execution endpoint.
//!
//! # Architecture
//!
//! - **`domain`** - Opportunities, the connection state machine, trade
//!   intents and states, token amounts
//! - **`port`** - Seams to the outside world: stream transport, contract
//!   gateway, execution API, notifiers
//! - **`application`** - Reconnection supervisor, dispatcher, opportunity
//!   registry, trade guard, execution service
//! - **`adapter`** - WebSocket, alloy, reqwest and logging implementations,
//!   plus the CLI
//! - **`infrastructure`** - Configuration and wiring
//!
//! # Features
//!
//! - `evm` (default) - On-chain gateway built on alloy
//! - `testkit` - Fakes and fixtures for integration tests
//!
//! # Example
//!
//! ```no_run
//! use arbwatch::infrastructure::bootstrap;
//! use arbwatch::infrastructure::config::settings::Config;
//!
//! # async fn run() -> arbwatch::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let mut client = bootstrap::build_stream_client(&config)?;
//! client.connect(config.api_token().map(str::to_owned)).await;
//! client.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
