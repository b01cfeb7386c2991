//! Composition root: configured adapters wired into application services.

use tracing::info;

use crate::adapter::outbound::http::HttpExecutionApi;
use crate::adapter::outbound::notifier::LogNotifier;
use crate::adapter::outbound::websocket::WebSocketTransport;
use crate::application::execution::{ExecutionOptions, ExecutionService};
use crate::application::registry::OpportunityRegistry;
use crate::application::stream::{StreamClient, StreamSupervisor};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::NotifierRegistry;

#[cfg(feature = "evm")]
use crate::adapter::outbound::evm::EvmGateway;
#[cfg(feature = "evm")]
use crate::application::trade::{GuardSettings, TradeGuard};

/// Notifiers every runtime gets.
pub(crate) fn build_notifier_registry() -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}

/// Build the streaming client over a real WebSocket.
///
/// # Errors
///
/// Returns an error if the stream URL is missing or malformed.
#[allow(clippy::result_large_err)]
pub fn build_stream_client(config: &Config) -> Result<StreamClient<WebSocketTransport>> {
    let url = config.stream_url()?;
    let supervisor = StreamSupervisor::new(WebSocketTransport::new(), url, &config.stream);
    let registry = OpportunityRegistry::new(
        config.registry.capacity,
        config.registry.alert_policy(),
    );
    info!(
        capacity = registry.capacity(),
        auto_reconnect = config.stream.auto_reconnect,
        "Stream client ready"
    );
    Ok(StreamClient::new(
        supervisor,
        registry,
        build_notifier_registry(),
    ))
}

/// Build the execution service for the configured endpoint.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when `execution.api_url` is unset.
#[allow(clippy::result_large_err)]
pub fn build_execution_service(config: &Config) -> Result<ExecutionService<HttpExecutionApi>> {
    if config.execution.api_url.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "execution.api_url",
        }
        .into());
    }
    let api = HttpExecutionApi::from_config(&config.execution);
    info!(endpoint = %api.endpoint(), "Execution client ready");
    Ok(ExecutionService::new(
        api,
        ExecutionOptions::from(&config.execution),
    ))
}

/// Build the trade guard over the configured RPC endpoint.
///
/// # Errors
///
/// Returns an error if the RPC URL, the private key or a contract address
/// is malformed.
#[cfg(feature = "evm")]
#[allow(clippy::result_large_err)]
pub fn build_trade_guard(config: &Config) -> Result<TradeGuard<EvmGateway>> {
    let gateway = EvmGateway::from_config(&config.ledger)?;
    let settings = GuardSettings::from_config(&config.ledger)?;
    Ok(TradeGuard::new(gateway, settings))
}
