//! Handler for the `trade` command.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::adapter::inbound::cli::command::TradeArgs;
use crate::adapter::inbound::cli::{confirm, load_config, output};
use crate::domain::id::{MarketId, TokenId};
use crate::domain::trade::{Side, TradeIntent, TradeMarket, TradeOutcome, TradeState};
use crate::error::{Error, Result, TradeError};
use crate::infrastructure::bootstrap;

/// Execute the trade command.
pub async fn execute(args: &TradeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let intent = build_intent(args)?;

    output::section("Trade");
    output::field("Market", &intent.market.market_id);
    output::field("Side", intent.side);
    output::field("Token", intent.token());
    output::field("Amount", format!("${}", intent.amount));
    output::field("Mode", if args.simulate { "simulated" } else { "live" });

    let mut guard = bootstrap::build_trade_guard(&config)?;

    if !args.simulate {
        let prompt = format!(
            "Buy ${} of {} on {}?",
            intent.amount, intent.side, intent.market.market_id
        );
        if !confirm(&prompt, args.yes)? {
            output::warning("Trade cancelled by user");
            return Ok(());
        }
    }

    let progress = spawn_progress(guard.subscribe());
    let result = if args.simulate {
        guard.simulate_trade(&intent).await
    } else {
        guard.execute_trade(&intent).await
    };
    drop(guard);
    let _ = progress.await;

    report(&result?)
}

fn build_intent(args: &TradeArgs) -> Result<TradeIntent> {
    let market = TradeMarket {
        market_id: MarketId::from(args.market.as_str()),
        yes_token: TokenId::from(args.yes_token.as_str()),
        no_token: TokenId::from(args.no_token.as_str()),
    };
    let side = Side::from(args.side);
    TradeIntent::new(market, side, args.amount).ok_or_else(|| {
        TradeError::InvalidAmount(format!("{} is not a positive dollar amount", args.amount))
            .into()
    })
}

/// Print every state the guard passes through, stopping at a terminal state
/// or when the guard is dropped.
fn spawn_progress(mut states: watch::Receiver<TradeState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow_and_update();
            if state != TradeState::Idle {
                output::action("State", &state.to_string());
            }
            if state.is_terminal() {
                break;
            }
        }
    })
}

fn report(outcome: &TradeOutcome) -> Result<()> {
    match outcome {
        TradeOutcome::Success {
            tx_hash,
            approval_tx_hash,
        } => {
            output::success("Trade confirmed");
            if let Some(approval) = approval_tx_hash {
                output::field("Approval", approval);
            }
            output::field("Transaction", tx_hash);
            Ok(())
        }
        TradeOutcome::Simulated => {
            output::success(&outcome.message());
            output::hint("drop --simulate to trade on-chain");
            Ok(())
        }
        TradeOutcome::InsufficientBalance {
            required,
            available,
            shortfall,
        } => {
            output::field("Required", format!("${required}"));
            output::field("Available", format!("${available}"));
            output::field("Shortfall", output::negative(format!("${shortfall}")));
            output::hint("fund the wallet with the settlement token and retry");
            Err(Error::Incomplete(outcome.message()))
        }
        TradeOutcome::Failed { state, message, .. } => {
            output::field("Failed at", state);
            Err(Error::Incomplete(message.clone()))
        }
    }
}
