//! Handler for the `balance` command.

use std::path::Path;

use crate::adapter::inbound::cli::{load_config, output};
use crate::error::{LedgerError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::PRIVATE_KEY_ENV;
use crate::port::ContractGateway;

/// Read the wallet's settlement-token balance and exchange allowance.
pub async fn execute(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let mut guard = bootstrap::build_trade_guard(&config)?;

    output::section("Wallet");
    let Some(account) = guard.gateway().account() else {
        output::hint(&format!("set {PRIVATE_KEY_ENV} to connect a wallet"));
        return Err(LedgerError::NoAccount.into());
    };
    output::field("Account", account);
    output::field("Token", &config.ledger.settlement_token);
    output::field("Spender", &config.ledger.exchange_address);

    output::action("Reading", "balance and allowance");
    let balances = guard.refresh_balances().await?;
    if let Some(balance) = balances.balance {
        let shown = format!("${balance}");
        output::field(
            "Balance",
            if balance.is_zero() {
                output::negative(shown)
            } else {
                output::positive(shown)
            },
        );
    }
    if let Some(allowance) = balances.allowance {
        output::field("Allowance", output::highlight(allowance));
        if allowance.is_zero() {
            output::note("The first live trade will approve the exchange before buying.");
        }
    }
    Ok(())
}
