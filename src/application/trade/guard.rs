//! Funds-safety guard around a single on-chain buy.
//!
//! One attempt runs as straight-line async code:
//!
//! ```text
//! idle -> checking-balance -> checking-allowance -> [approving -> waiting-approval ->]
//!      -> trading -> waiting-trade -> success
//! ```
//!
//! with early exits to `insufficient-balance` (nothing written) and `error`.
//! Every attempt's history starts again at `idle`.

use std::time::Duration;

use alloy_primitives::Address;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::money::TokenAmount;
use crate::domain::trade::{FailureKind, TradeIntent, TradeOutcome, TradeState};
use crate::error::{ConfigError, LedgerError, TradeError};
use crate::infrastructure::config::ledger::LedgerConfig;
use crate::port::{ContractGateway, ContractRead, ContractWrite, PendingTx};

/// Contract addresses and timing used by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardSettings {
    pub settlement_token: Address,
    pub exchange: Address,
    pub simulate_delay: Duration,
}

impl GuardSettings {
    /// # Errors
    ///
    /// Returns an error if either configured address is malformed.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            settlement_token: config.settlement_token_address()?,
            exchange: config.exchange_contract_address()?,
            simulate_delay: config.simulate_delay(),
        })
    }
}

/// Last values read from the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balances {
    pub balance: Option<TokenAmount>,
    pub allowance: Option<TokenAmount>,
}

pub struct TradeGuard<G: ContractGateway> {
    gateway: G,
    settings: GuardSettings,
    state: TradeState,
    history: Vec<TradeState>,
    balances: Balances,
    state_tx: watch::Sender<TradeState>,
}

impl<G: ContractGateway> TradeGuard<G> {
    pub fn new(gateway: G, settings: GuardSettings) -> Self {
        let (state_tx, _) = watch::channel(TradeState::Idle);
        Self {
            gateway,
            settings,
            state: TradeState::Idle,
            history: vec![TradeState::Idle],
            balances: Balances::default(),
            state_tx,
        }
    }

    #[must_use]
    pub const fn state(&self) -> TradeState {
        self.state
    }

    /// States visited by the current or most recent attempt, starting at idle.
    #[must_use]
    pub fn history(&self) -> &[TradeState] {
        &self.history
    }

    #[must_use]
    pub const fn balances(&self) -> Balances {
        self.balances
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TradeState> {
        self.state_tx.subscribe()
    }

    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Force the guard back to idle, e.g. after an attempt was abandoned
    /// mid-flight. Broadcast transactions are not cancelled.
    pub fn reset(&mut self) {
        self.history = vec![TradeState::Idle];
        self.set_state(TradeState::Idle);
    }

    /// Read balance and allowance without changing the guard state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NoAccount`] without a wallet, or the read error.
    pub async fn refresh_balances(&mut self) -> Result<Balances, LedgerError> {
        let owner = self.gateway.account().ok_or(LedgerError::NoAccount)?;
        self.read_balance(owner).await?;
        self.read_allowance(owner).await?;
        Ok(self.balances)
    }

    /// Check funds, approve if needed, then buy.
    ///
    /// Only precondition failures are returned as `Err`; every outcome after
    /// the first read, including insufficient balance and on-chain failures,
    /// is a [`TradeOutcome`].
    ///
    /// # Errors
    ///
    /// - [`TradeError::NoWallet`] when no account is connected (state untouched)
    /// - [`TradeError::Busy`] while a previous attempt is in flight
    /// - [`TradeError::InvalidAmount`] for a zero amount
    pub async fn execute_trade(
        &mut self,
        intent: &TradeIntent,
    ) -> Result<TradeOutcome, TradeError> {
        let owner = self.gateway.account().ok_or(TradeError::NoWallet)?;
        self.ensure_ready(intent)?;
        self.begin();

        let required = intent.amount;
        info!(
            market_id = %intent.market.market_id,
            side = %intent.side,
            amount = %required,
            "Starting trade"
        );

        self.transition(TradeState::CheckingBalance);
        let available = match self.read_balance(owner).await {
            Ok(balance) => balance,
            Err(e) => return Ok(self.fail(&e)),
        };
        if available < required {
            let shortfall = required.saturating_sub(available);
            warn!(%required, %available, %shortfall, "Insufficient balance");
            self.transition(TradeState::InsufficientBalance);
            return Ok(TradeOutcome::InsufficientBalance {
                required,
                available,
                shortfall,
            });
        }

        self.transition(TradeState::CheckingAllowance);
        let allowance = match self.read_allowance(owner).await {
            Ok(allowance) => allowance,
            Err(e) => return Ok(self.fail(&e)),
        };

        let approval_tx_hash = if allowance < required {
            match self.approve().await {
                Ok(tx_hash) => Some(tx_hash),
                Err(e) => return Ok(self.fail(&e)),
            }
        } else {
            None
        };

        self.transition(TradeState::Trading);
        let buy = ContractWrite::Buy {
            exchange: self.settings.exchange,
            token_id: intent.token().clone(),
            amount: required,
        };
        let tx_hash = match self.submit_and_wait(buy, TradeState::WaitingTrade).await {
            Ok(tx_hash) => tx_hash,
            Err(e) => return Ok(self.fail(&e)),
        };

        info!(tx_hash = %tx_hash, "Trade confirmed");
        self.transition(TradeState::Success);
        Ok(TradeOutcome::Success {
            tx_hash,
            approval_tx_hash,
        })
    }

    /// Dry run: idle, trading, then success after the configured delay.
    /// Nothing is read or written and no wallet is needed.
    ///
    /// # Errors
    ///
    /// Returns [`TradeError::Busy`] while a previous attempt is in flight, or
    /// [`TradeError::InvalidAmount`] for a zero amount.
    pub async fn simulate_trade(
        &mut self,
        intent: &TradeIntent,
    ) -> Result<TradeOutcome, TradeError> {
        self.ensure_ready(intent)?;
        self.begin();
        info!(
            market_id = %intent.market.market_id,
            side = %intent.side,
            amount = %intent.amount,
            "Simulating trade"
        );
        self.transition(TradeState::Trading);
        tokio::time::sleep(self.settings.simulate_delay).await;
        self.transition(TradeState::Success);
        Ok(TradeOutcome::Simulated)
    }

    fn ensure_ready(&self, intent: &TradeIntent) -> Result<(), TradeError> {
        if self.state.is_in_flight() {
            return Err(TradeError::Busy { state: self.state });
        }
        if intent.amount.is_zero() {
            return Err(TradeError::InvalidAmount("amount must be greater than 0".into()));
        }
        Ok(())
    }

    async fn approve(&mut self) -> Result<String, LedgerError> {
        self.transition(TradeState::Approving);
        let write = ContractWrite::Approve {
            token: self.settings.settlement_token,
            spender: self.settings.exchange,
            amount: TokenAmount::UNLIMITED,
        };
        let tx_hash = self
            .submit_and_wait(write, TradeState::WaitingApproval)
            .await?;
        info!(tx_hash = %tx_hash, "Approval confirmed");
        self.balances.allowance = Some(TokenAmount::UNLIMITED);
        Ok(tx_hash)
    }

    /// Broadcast, move to `waiting`, then block on the receipt.
    async fn submit_and_wait(
        &mut self,
        write: ContractWrite,
        waiting: TradeState,
    ) -> Result<String, LedgerError> {
        let pending: PendingTx = self.gateway.write_contract(write).await?;
        info!(tx_hash = %pending.tx_hash, "Transaction submitted");
        self.transition(waiting);
        let receipt = self.gateway.wait_for_receipt(&pending).await?;
        if !receipt.success {
            return Err(LedgerError::Reverted {
                tx_hash: receipt.tx_hash,
            });
        }
        Ok(receipt.tx_hash)
    }

    async fn read_balance(&mut self, owner: Address) -> Result<TokenAmount, LedgerError> {
        let balance = self
            .gateway
            .read_contract(ContractRead::BalanceOf {
                token: self.settings.settlement_token,
                owner,
            })
            .await?;
        self.balances.balance = Some(balance);
        Ok(balance)
    }

    async fn read_allowance(&mut self, owner: Address) -> Result<TokenAmount, LedgerError> {
        let allowance = self
            .gateway
            .read_contract(ContractRead::Allowance {
                token: self.settings.settlement_token,
                owner,
                spender: self.settings.exchange,
            })
            .await?;
        self.balances.allowance = Some(allowance);
        Ok(allowance)
    }

    fn fail(&mut self, error: &LedgerError) -> TradeOutcome {
        let raw = error.to_string();
        let kind = FailureKind::classify(&raw);
        let message = kind.message(&raw);
        let state = self.state;
        warn!(%state, error = %raw, "Trade failed");
        self.transition(TradeState::Error);
        TradeOutcome::Failed {
            state,
            kind,
            message,
        }
    }

    fn begin(&mut self) {
        self.history = vec![TradeState::Idle];
        self.set_state(TradeState::Idle);
    }

    fn transition(&mut self, next: TradeState) {
        self.history.push(next);
        self.set_state(next);
    }

    fn set_state(&mut self, next: TradeState) {
        self.state = next;
        self.state_tx.send_replace(next);
    }
}
