//! In-memory [`ContractGateway`] for trade guard tests.
//!
//! Balances are configured in dollars. Approvals update the stored allowance
//! and buys debit the balance once their receipt is awaited, mirroring what
//! a chain would show. Clones share state, so a test can keep a handle after
//! moving the ledger into a guard.

use std::collections::VecDeque;
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::domain::money::TokenAmount;
use crate::error::LedgerError;
use crate::port::{ContractGateway, ContractRead, ContractWrite, PendingTx, TxReceipt};

/// Address used as the signing account.
pub const ACCOUNT: Address = Address::repeat_byte(0xAA);

#[derive(Debug, Default)]
struct LedgerState {
    balance: TokenAmount,
    allowance: TokenAmount,
    reads: Vec<ContractRead>,
    writes: Vec<ContractWrite>,
    read_failure: Option<String>,
    write_failures: VecDeque<String>,
    reverts: VecDeque<bool>,
    pending: Vec<(String, ContractWrite)>,
}

#[derive(Debug, Clone)]
pub struct FakeLedger {
    account: Option<Address>,
    state: Arc<Mutex<LedgerState>>,
}

fn units(usd: Decimal) -> TokenAmount {
    TokenAmount::from_decimal(usd).unwrap_or_default()
}

impl FakeLedger {
    /// A connected wallet with the given balance and allowance in dollars.
    pub fn funded(balance_usd: Decimal, allowance_usd: Decimal) -> Self {
        let state = LedgerState {
            balance: units(balance_usd),
            allowance: units(allowance_usd),
            ..LedgerState::default()
        };
        Self {
            account: Some(ACCOUNT),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// No wallet connected.
    pub fn without_account() -> Self {
        Self {
            account: None,
            state: Arc::default(),
        }
    }

    /// Every read fails with `message` from now on.
    pub fn fail_reads(&self, message: &str) {
        self.state.lock().read_failure = Some(message.to_string());
    }

    /// The next write is rejected with `message`.
    pub fn fail_next_write(&self, message: &str) {
        self.state.lock().write_failures.push_back(message.to_string());
    }

    /// The next awaited receipt reports a revert.
    pub fn revert_next(&self) {
        self.state.lock().reverts.push_back(true);
    }

    pub fn reads(&self) -> Vec<ContractRead> {
        self.state.lock().reads.clone()
    }

    pub fn writes(&self) -> Vec<ContractWrite> {
        self.state.lock().writes.clone()
    }

    pub fn balance(&self) -> TokenAmount {
        self.state.lock().balance
    }

    pub fn allowance(&self) -> TokenAmount {
        self.state.lock().allowance
    }
}

#[async_trait]
impl ContractGateway for FakeLedger {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn read_contract(&self, read: ContractRead) -> Result<TokenAmount, LedgerError> {
        let mut state = self.state.lock();
        state.reads.push(read.clone());
        if let Some(message) = &state.read_failure {
            return Err(LedgerError::Rpc(message.clone()));
        }
        Ok(match read {
            ContractRead::BalanceOf { .. } => state.balance,
            ContractRead::Allowance { .. } => state.allowance,
        })
    }

    async fn write_contract(&self, write: ContractWrite) -> Result<PendingTx, LedgerError> {
        let mut state = self.state.lock();
        if let Some(message) = state.write_failures.pop_front() {
            return Err(LedgerError::Rejected(message));
        }
        state.writes.push(write.clone());
        let tx_hash = format!("0x{:064x}", state.writes.len());
        state.pending.push((tx_hash.clone(), write));
        Ok(PendingTx { tx_hash })
    }

    async fn wait_for_receipt(&self, pending: &PendingTx) -> Result<TxReceipt, LedgerError> {
        let mut state = self.state.lock();
        let Some(index) = state
            .pending
            .iter()
            .position(|(hash, _)| hash == &pending.tx_hash)
        else {
            return Err(LedgerError::Rpc(format!(
                "unknown transaction {}",
                pending.tx_hash
            )));
        };
        let (tx_hash, write) = state.pending.remove(index);
        let reverted = state.reverts.pop_front().unwrap_or(false);
        if !reverted {
            match write {
                ContractWrite::Approve { amount, .. } => state.allowance = amount,
                ContractWrite::Buy { amount, .. } => {
                    state.balance = state.balance.saturating_sub(amount);
                }
            }
        }
        Ok(TxReceipt {
            tx_hash,
            success: !reverted,
        })
    }
}
