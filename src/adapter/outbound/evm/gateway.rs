//! [`ContractGateway`] over a JSON-RPC endpoint.
//!
//! Reads go through a plain HTTP provider; writes are signed locally with the
//! key from `WALLET_PRIVATE_KEY`. Receipts are polled until mined or the
//! configured timeout elapses.

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use alloy_provider::network::EthereumWallet;
use alloy_provider::{Provider, ProviderBuilder};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::sol;
use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};
use url::Url;

use crate::domain::id::TokenId;
use crate::domain::money::TokenAmount;
use crate::error::{ConfigError, LedgerError, Result};
use crate::infrastructure::config::ledger::LedgerConfig;
use crate::infrastructure::config::settings::PRIVATE_KEY_ENV;
use crate::port::{ContractGateway, ContractRead, ContractWrite, PendingTx, TxReceipt};

// Settlement token (minimal ERC-20)
sol! {
    #[sol(rpc)]
    contract IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }
}

// Exchange entry point for outcome-token purchases
sol! {
    #[sol(rpc)]
    contract IExchange {
        function buy(uint256 tokenId, uint256 amount) external;
    }
}

pub struct EvmGateway {
    signer: Option<PrivateKeySigner>,
    rpc_url: Url,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl EvmGateway {
    /// Build from the `[ledger]` section. A missing key yields a read-only
    /// gateway without an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC URL or the private key is malformed.
    #[allow(clippy::result_large_err)]
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        let rpc_url = Url::parse(&config.rpc_url).map_err(|e| ConfigError::InvalidValue {
            field: "ledger.rpc_url",
            reason: e.to_string(),
        })?;

        let signer = match config.private_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                Some(
                    PrivateKeySigner::from_str(key).map_err(|e| ConfigError::InvalidValue {
                        field: PRIVATE_KEY_ENV,
                        reason: e.to_string(),
                    })?,
                )
            }
            _ => None,
        };

        Ok(Self {
            signer,
            rpc_url,
            poll_interval: config.receipt_poll_interval(),
            receipt_timeout: config.receipt_timeout(),
        })
    }

    fn signer(&self) -> std::result::Result<&PrivateKeySigner, LedgerError> {
        self.signer.as_ref().ok_or(LedgerError::NoAccount)
    }
}

fn parse_token_id(token_id: &TokenId) -> std::result::Result<U256, LedgerError> {
    U256::from_str(token_id.as_str())
        .map_err(|e| LedgerError::Rejected(format!("invalid token id {token_id}: {e}")))
}

#[async_trait]
impl ContractGateway for EvmGateway {
    fn account(&self) -> Option<Address> {
        self.signer.as_ref().map(PrivateKeySigner::address)
    }

    async fn read_contract(
        &self,
        read: ContractRead,
    ) -> std::result::Result<TokenAmount, LedgerError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());

        let units: U256 = match read {
            ContractRead::BalanceOf { token, owner } => IERC20::new(token, &provider)
                .balanceOf(owner)
                .call()
                .await
                .map_err(|e| LedgerError::Rpc(format!("failed to get balance: {e}")))?,
            ContractRead::Allowance {
                token,
                owner,
                spender,
            } => IERC20::new(token, &provider)
                .allowance(owner, spender)
                .call()
                .await
                .map_err(|e| LedgerError::Rpc(format!("failed to get allowance: {e}")))?,
        };

        Ok(TokenAmount::from_units(units))
    }

    async fn write_contract(
        &self,
        write: ContractWrite,
    ) -> std::result::Result<PendingTx, LedgerError> {
        let wallet = EthereumWallet::from(self.signer()?.clone());
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.rpc_url.clone());

        let pending = match write {
            ContractWrite::Approve {
                token,
                spender,
                amount,
            } => {
                info!(%token, %spender, %amount, "Submitting approval");
                IERC20::new(token, &provider)
                    .approve(spender, amount.units())
                    .send()
                    .await
            }
            ContractWrite::Buy {
                exchange,
                token_id,
                amount,
            } => {
                let token = parse_token_id(&token_id)?;
                info!(%exchange, token_id = %token_id, %amount, "Submitting buy");
                IExchange::new(exchange, &provider)
                    .buy(token, amount.units())
                    .send()
                    .await
            }
        }
        .map_err(|e| LedgerError::Rejected(e.to_string()))?;

        Ok(PendingTx {
            tx_hash: format!("{:?}", pending.tx_hash()),
        })
    }

    async fn wait_for_receipt(
        &self,
        pending: &PendingTx,
    ) -> std::result::Result<TxReceipt, LedgerError> {
        let hash = B256::from_str(&pending.tx_hash)
            .map_err(|e| LedgerError::Rpc(format!("invalid transaction hash: {e}")))?;
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.clone());
        let deadline = Instant::now() + self.receipt_timeout;

        loop {
            let receipt = provider
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| LedgerError::Rpc(format!("failed to get receipt: {e}")))?;

            if let Some(receipt) = receipt {
                let success = receipt.status();
                debug!(tx_hash = %pending.tx_hash, success, "Receipt received");
                return Ok(TxReceipt {
                    tx_hash: pending.tx_hash.clone(),
                    success,
                });
            }

            if Instant::now() >= deadline {
                return Err(LedgerError::ReceiptTimeout {
                    tx_hash: pending.tx_hash.clone(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    #[test]
    fn without_key_has_no_account() {
        let gateway = EvmGateway::from_config(&LedgerConfig::default()).unwrap();
        assert!(gateway.account().is_none());
    }

    #[test]
    fn derives_account_from_key() {
        let config = LedgerConfig {
            private_key: Some(
                "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".into(),
            ),
            ..LedgerConfig::default()
        };
        let gateway = EvmGateway::from_config(&config).unwrap();
        assert!(gateway.account().is_some());
    }

    #[test]
    fn malformed_key_is_config_error() {
        let config = LedgerConfig {
            private_key: Some("not-a-key".into()),
            ..LedgerConfig::default()
        };
        assert!(EvmGateway::from_config(&config).is_err());
    }

    // ------------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------------

    #[test]
    fn token_ids_parse_as_decimal_u256() {
        let id = TokenId::from(
            "71321045679252212594626385532706912750332728571942532289631379312455583992563",
        );
        assert!(parse_token_id(&id).is_ok());
        assert!(parse_token_id(&TokenId::from("yes")).is_err());
    }

    #[tokio::test]
    async fn writes_without_key_report_no_account() {
        let gateway = EvmGateway::from_config(&LedgerConfig::default()).unwrap();
        let err = gateway
            .write_contract(ContractWrite::Approve {
                token: Address::ZERO,
                spender: Address::ZERO,
                amount: TokenAmount::UNLIMITED,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NoAccount));
    }
}
