//! CLI module graph and command dispatch.

#[cfg(feature = "evm")]
pub mod balance;
pub mod command;
pub mod config;
pub mod execute;
pub mod output;
pub mod paths;
#[cfg(feature = "evm")]
pub mod trade;
pub mod watch;

use std::path::Path;

use dialoguer::Confirm;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use command::{Commands, ConfigCommand};

/// Run the parsed subcommand.
pub async fn run(command: &Commands) -> Result<()> {
    match command {
        Commands::Watch(args) => watch::execute(args).await,
        Commands::Trade(args) => trade_command(args).await,
        Commands::Execute(args) => execute::execute(args).await,
        Commands::Balance(arg) => balance_command(&arg.config).await,
        Commands::Config(ConfigCommand::Show(arg)) => config::execute_show(&arg.config),
        Commands::Config(ConfigCommand::Validate(arg)) => config::execute_validate(&arg.config),
    }
}

#[cfg(feature = "evm")]
async fn trade_command(args: &command::TradeArgs) -> Result<()> {
    trade::execute(args).await
}

#[cfg(not(feature = "evm"))]
async fn trade_command(_args: &command::TradeArgs) -> Result<()> {
    Err(evm_disabled())
}

#[cfg(feature = "evm")]
async fn balance_command(path: &Path) -> Result<()> {
    balance::execute(path).await
}

#[cfg(not(feature = "evm"))]
async fn balance_command(_path: &Path) -> Result<()> {
    Err(evm_disabled())
}

#[cfg(not(feature = "evm"))]
fn evm_disabled() -> crate::error::Error {
    crate::error::ConfigError::InvalidValue {
        field: "ledger",
        reason: "on-chain commands need the `evm` feature".to_string(),
    }
    .into()
}

/// Load the config file and start logging.
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load(path)?;
    config.init_logging();
    Ok(config)
}

/// Ask before moving funds. `skip` answers yes without prompting.
pub(crate) fn confirm(prompt: &str, skip: bool) -> Result<bool> {
    if skip {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
