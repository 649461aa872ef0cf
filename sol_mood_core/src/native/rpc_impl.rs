// Native RPC client implementation wrapping solana_client::RpcClient

use crate::error::CoreError;
use crate::rpc_client::{RpcClient as RpcClientTrait, RpcResult, TokenAmount};
use async_trait::async_trait;
use log::debug;
use solana_client::rpc_client::RpcClient as SolanaRpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::Transaction;
use std::str::FromStr;
use std::sync::Arc;

/// Native RPC client wrapping solana_client::RpcClient
pub struct NativeRpcClient {
    client: Arc<SolanaRpcClient>,
}

impl NativeRpcClient {
    /// Create a new native RPC client
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Arc::new(SolanaRpcClient::new(endpoint)),
        }
    }

    /// Run a blocking solana_client call off the async runtime
    async fn blocking<T, F>(&self, f: F) -> RpcResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SolanaRpcClient) -> RpcResult<T> + Send + 'static,
    {
        let client = self.client.clone();
        tokio::task::spawn_blocking(move || f(client.as_ref()))
            .await
            .map_err(|e| CoreError::Rpc(format!("Task join error: {}", e)))?
    }
}

fn parse_pubkey(s: &str) -> RpcResult<Pubkey> {
    Pubkey::from_str(s).map_err(|e| CoreError::ParseError(format!("Invalid pubkey {}: {}", s, e)))
}

fn parse_transaction(bytes: &[u8]) -> RpcResult<Transaction> {
    bincode::deserialize(bytes)
        .map_err(|e| CoreError::ParseError(format!("Failed to deserialize transaction: {}", e)))
}

#[async_trait]
impl RpcClientTrait for NativeRpcClient {
    async fn get_latest_blockhash(&self) -> RpcResult<String> {
        debug!("Native RPC: get_latest_blockhash");
        let blockhash = self
            .blocking(|c| {
                c.get_latest_blockhash()
                    .map_err(|e| CoreError::Rpc(format!("get_latest_blockhash failed: {}", e)))
            })
            .await?;
        Ok(blockhash.to_string())
    }

    async fn get_balance(&self, owner: &str) -> RpcResult<u64> {
        debug!("Native RPC: get_balance for {}", owner);
        let owner = parse_pubkey(owner)?;
        self.blocking(move |c| {
            c.get_balance(&owner)
                .map_err(|e| CoreError::Rpc(format!("get_balance failed: {}", e)))
        })
        .await
    }

    async fn get_token_accounts_by_owner(&self, owner: &str, mint: &str) -> RpcResult<Vec<String>> {
        debug!("Native RPC: get_token_accounts_by_owner {} mint {}", owner, mint);
        let owner = parse_pubkey(owner)?;
        let mint = parse_pubkey(mint)?;
        let accounts = self
            .blocking(move |c| {
                c.get_token_accounts_by_owner(&owner, TokenAccountsFilter::Mint(mint))
                    .map_err(|e| CoreError::Rpc(format!("get_token_accounts_by_owner failed: {}", e)))
            })
            .await?;
        Ok(accounts.into_iter().map(|a| a.pubkey).collect())
    }

    async fn get_token_account_balance(&self, pubkey: &str) -> RpcResult<TokenAmount> {
        debug!("Native RPC: get_token_account_balance for {}", pubkey);
        let pubkey = parse_pubkey(pubkey)?;
        let balance = self
            .blocking(move |c| {
                c.get_token_account_balance(&pubkey)
                    .map_err(|e| CoreError::Rpc(format!("get_token_account_balance failed: {}", e)))
            })
            .await?;
        let amount = balance
            .amount
            .parse::<u64>()
            .map_err(|e| CoreError::ParseError(format!("Failed to parse token balance: {}", e)))?;
        Ok(TokenAmount {
            amount,
            decimals: balance.decimals,
        })
    }

    async fn send_transaction(&self, transaction: &[u8]) -> RpcResult<String> {
        debug!("Native RPC: send_transaction");
        let tx = parse_transaction(transaction)?;
        let signature = self
            .blocking(move |c| {
                c.send_and_confirm_transaction(&tx)
                    .map_err(|e| CoreError::Rpc(format!("send_transaction failed: {}", e)))
            })
            .await?;
        Ok(signature.to_string())
    }

    async fn simulate_transaction(&self, transaction: &[u8]) -> RpcResult<()> {
        debug!("Native RPC: simulate_transaction");
        let tx = parse_transaction(transaction)?;
        let result = self
            .blocking(move |c| {
                c.simulate_transaction(&tx)
                    .map_err(|e| CoreError::Rpc(format!("simulate_transaction failed: {}", e)))
            })
            .await?;
        match result.value.err {
            None => Ok(()),
            Some(err) => {
                let logs = result.value.logs.unwrap_or_default().join("; ");
                Err(CoreError::Rpc(format!("simulation failed: {} ({})", err, logs)))
            }
        }
    }
}
