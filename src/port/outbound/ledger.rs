//! On-chain ledger port.
//!
//! The trade guard only needs four capabilities from a wallet: who is
//! signing, contract reads, contract writes that return a pending handle, and
//! waiting on a pending handle until it is mined. Keeping the surface this
//! small lets the guard stay straight-line async code with no knowledge of
//! providers, nonces or gas.

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::domain::id::TokenId;
use crate::domain::money::TokenAmount;
use crate::error::LedgerError;

/// A view call against an ERC-20 style settlement token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractRead {
    /// `balanceOf(owner)`.
    BalanceOf { token: Address, owner: Address },
    /// `allowance(owner, spender)`.
    Allowance {
        token: Address,
        owner: Address,
        spender: Address,
    },
}

/// A state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractWrite {
    /// `approve(spender, amount)` on the settlement token.
    Approve {
        token: Address,
        spender: Address,
        amount: TokenAmount,
    },
    /// `buy(tokenId, amount)` on the exchange contract.
    Buy {
        exchange: Address,
        token_id: TokenId,
        amount: TokenAmount,
    },
}

/// Handle to a broadcast but not yet mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTx {
    pub tx_hash: String,
}

/// Mined transaction outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
    /// False when the transaction was mined but reverted.
    pub success: bool,
}

/// Wallet capability consumed by the trade guard.
///
/// # Errors
///
/// Every call returns [`LedgerError`]; its Display text is the provider's
/// message so it can be classified for display.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    /// Address of the signing account, if a wallet is connected.
    fn account(&self) -> Option<Address>;

    /// Execute a view call and decode the `uint256` result.
    async fn read_contract(&self, read: ContractRead) -> Result<TokenAmount, LedgerError>;

    /// Sign and broadcast a transaction.
    async fn write_contract(&self, write: ContractWrite) -> Result<PendingTx, LedgerError>;

    /// Wait until the transaction is mined.
    async fn wait_for_receipt(&self, pending: &PendingTx) -> Result<TxReceipt, LedgerError>;
}
