// RPC client abstraction - the ledger operations the balance reader and the
// trade executor need, implemented natively over solana_client

use crate::error::CoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, CoreError>;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// SPL token balance of one token account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAmount {
    /// Raw amount in base units.
    pub amount: u64,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn ui_amount(&self) -> f64 {
        self.amount as f64 / 10f64.powi(self.decimals as i32)
    }
}

#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Get latest blockhash (base58)
    async fn get_latest_blockhash(&self) -> RpcResult<String>;

    /// Native SOL balance in lamports
    async fn get_balance(&self, owner: &str) -> RpcResult<u64>;

    /// Token accounts owned by `owner` for `mint`
    async fn get_token_accounts_by_owner(&self, owner: &str, mint: &str) -> RpcResult<Vec<String>>;

    /// Get token account balance
    async fn get_token_account_balance(&self, pubkey: &str) -> RpcResult<TokenAmount>;

    /// Send a bincode-serialized signed transaction, returning its signature
    async fn send_transaction(&self, transaction: &[u8]) -> RpcResult<String>;

    /// Simulate a bincode-serialized signed transaction; `Err` when the
    /// simulation reports a transaction error
    async fn simulate_transaction(&self, transaction: &[u8]) -> RpcResult<()>;
}

/// Convert a SOL amount to lamports, rounded to the nearest lamport.
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Scale a UI token amount to base units for a mint with `decimals`.
pub fn ui_to_base_units(ui_amount: f64, decimals: u8) -> u64 {
    (ui_amount * 10f64.powi(decimals as i32)).round() as u64
}
