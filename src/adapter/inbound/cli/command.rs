//! Command-line interface definitions.
//!
//! Defines the CLI structure for arbwatch using `clap`: a foreground stream
//! watcher, the guarded on-chain trade, the REST execution call and a few
//! configuration helpers.

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use super::paths;
use crate::domain::trade::Side;

/// Prediction market arbitrage opportunity watcher and executor
#[derive(Parser, Debug)]
#[command(name = "arbwatch")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream opportunities and report alerts (foreground)
    Watch(WatchArgs),

    /// Buy one side of a market through the guarded executor
    Trade(TradeArgs),

    /// Submit an opportunity to the remote execution endpoint
    Execute(ExecuteArgs),

    /// Show the wallet's settlement-token balance and allowance
    Balance(ConfigPathArg),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `arbwatch config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `watch` subcommand.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Only stream these markets (comma-separated, replaces `[stream.subscribe]`)
    #[arg(long, value_delimiter = ',')]
    pub markets: Vec<String>,

    /// Topics to subscribe to (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub topics: Vec<String>,

    /// Minimum expected profit percentage the server should forward
    #[arg(long)]
    pub min_profit: Option<f64>,

    /// Stop after this many new opportunities
    #[arg(long)]
    pub limit: Option<usize>,

    /// Number of most profitable opportunities to list on exit
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

impl WatchArgs {
    /// Whether any subscription filter was given on the command line.
    #[must_use]
    pub fn has_filter(&self) -> bool {
        !self.markets.is_empty() || !self.topics.is_empty() || self.min_profit.is_some()
    }
}

/// Which side of the market to buy.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SideArg {
    Yes,
    No,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Yes => Self::Yes,
            SideArg::No => Self::No,
        }
    }
}

/// Arguments for the `trade` subcommand.
#[derive(Parser, Debug)]
pub struct TradeArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Market condition identifier
    #[arg(long)]
    pub market: String,

    /// Outcome token id of the YES side
    #[arg(long)]
    pub yes_token: String,

    /// Outcome token id of the NO side
    #[arg(long)]
    pub no_token: String,

    /// Side to buy
    #[arg(long, value_enum)]
    pub side: SideArg,

    /// Notional in dollars of the settlement token
    #[arg(long)]
    pub amount: Decimal,

    /// Walk the state machine without touching the chain
    #[arg(long)]
    pub simulate: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `execute` subcommand.
#[derive(Parser, Debug)]
pub struct ExecuteArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Opportunity identifier as reported by the stream
    pub opportunity_id: String,

    /// Trade size in dollars
    #[arg(long)]
    pub size: Decimal,

    /// Maximum slippage as a fraction (overrides `execution.max_slippage`)
    #[arg(long)]
    pub max_slippage: Option<Decimal>,

    /// Execute for real instead of a dry run
    #[arg(long)]
    pub live: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "arbwatch");
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["arbwatch", "--json", "-vv", "balance"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.color, ColorChoice::Auto));
        assert!(matches!(cli.command, Commands::Balance(_)));
    }

    #[test]
    fn test_parse_color_never() {
        let cli = Cli::try_parse_from(["arbwatch", "--color", "never", "balance"]).unwrap();
        assert!(matches!(cli.color, ColorChoice::Never));
    }

    #[test]
    fn test_watch_filters_split_on_commas() {
        let cli = Cli::try_parse_from([
            "arbwatch",
            "watch",
            "--markets",
            "m1,m2",
            "--min-profit",
            "2.5",
        ])
        .unwrap();
        let Commands::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.markets, vec!["m1", "m2"]);
        assert_eq!(args.min_profit, Some(2.5));
        assert_eq!(args.top, 5);
        assert!(args.has_filter());
    }

    #[test]
    fn test_watch_without_filters() {
        let cli = Cli::try_parse_from(["arbwatch", "watch"]).unwrap();
        let Commands::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert!(!args.has_filter());
        assert!(args.limit.is_none());
    }

    #[test]
    fn test_trade_args() {
        let cli = Cli::try_parse_from([
            "arbwatch",
            "trade",
            "--market",
            "0xabc",
            "--yes-token",
            "1",
            "--no-token",
            "2",
            "--side",
            "no",
            "--amount",
            "12.5",
            "--simulate",
        ])
        .unwrap();
        let Commands::Trade(args) = cli.command else {
            panic!("expected trade");
        };
        assert_eq!(Side::from(args.side), Side::No);
        assert_eq!(args.amount, dec!(12.5));
        assert!(args.simulate);
        assert!(!args.yes);
    }

    #[test]
    fn test_trade_requires_side() {
        let result = Cli::try_parse_from([
            "arbwatch",
            "trade",
            "--market",
            "0xabc",
            "--yes-token",
            "1",
            "--no-token",
            "2",
            "--amount",
            "10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_execute_defaults_to_dry_run() {
        let cli =
            Cli::try_parse_from(["arbwatch", "execute", "opp-1", "--size", "100"]).unwrap();
        let Commands::Execute(args) = cli.command else {
            panic!("expected execute");
        };
        assert_eq!(args.opportunity_id, "opp-1");
        assert_eq!(args.size, dec!(100));
        assert!(!args.live);
        assert!(args.max_slippage.is_none());
    }

    #[test]
    fn test_config_validate_path() {
        let cli =
            Cli::try_parse_from(["arbwatch", "config", "validate", "-c", "custom.toml"]).unwrap();
        let Commands::Config(ConfigCommand::Validate(arg)) = cli.command else {
            panic!("expected config validate");
        };
        assert_eq!(arg.config, PathBuf::from("custom.toml"));
    }
}
