// Balance reader: wallet holdings of the base token and SOL, read fresh from
// the ledger on every call

use crate::error::{DataSource, FetchError};
use crate::models::Balance;
use crate::rpc_client::{lamports_to_sol, RpcClient};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn fetch_balance(&self) -> Result<Balance, FetchError>;
}

pub struct LedgerBalanceReader {
    rpc: Arc<dyn RpcClient>,
    owner: String,
    base_mint: String,
}

impl LedgerBalanceReader {
    pub fn new(rpc: Arc<dyn RpcClient>, owner: String, base_mint: String) -> Self {
        Self { rpc, owner, base_mint }
    }

    async fn base_token_balance(&self) -> Result<f64, FetchError> {
        let accounts = self
            .rpc
            .get_token_accounts_by_owner(&self.owner, &self.base_mint)
            .await
            .map_err(|e| FetchError::Network(DataSource::Balance, e.to_string()))?;

        // Holdings are read from the first account, matching how sells pick their source.
        let Some(account) = accounts.first() else {
            debug!("No token account for mint {} owned by {}", self.base_mint, self.owner);
            return Ok(0.0);
        };
        let amount = self
            .rpc
            .get_token_account_balance(account)
            .await
            .map_err(|e| FetchError::Network(DataSource::Balance, e.to_string()))?;
        Ok(amount.ui_amount())
    }
}

#[async_trait]
impl BalanceReader for LedgerBalanceReader {
    async fn fetch_balance(&self) -> Result<Balance, FetchError> {
        let lamports = self
            .rpc
            .get_balance(&self.owner)
            .await
            .map_err(|e| FetchError::Network(DataSource::Balance, e.to_string()))?;
        let base = self.base_token_balance().await?;
        let balance = Balance {
            base,
            quote: lamports_to_sol(lamports),
        };
        if !(balance.base.is_finite() && balance.base >= 0.0) {
            return Err(FetchError::Malformed(
                DataSource::Balance,
                format!("invalid base balance {}", balance.base),
            ));
        }
        Ok(balance)
    }
}
