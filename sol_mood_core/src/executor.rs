// Trade executor: builds, signs and submits the transfer for one trade side
// No automatic retries; a failed submission is reported once

use crate::error::SubmissionError;
use crate::models::{Side, TradeReceipt};
use crate::rpc_client::{sol_to_lamports, ui_to_base_units, RpcClient};
use crate::transaction_signer::TransactionSigner;
use async_trait::async_trait;
use log::{info, warn};
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::system_instruction;
use spl_associated_token_account::get_associated_token_address;
use std::str::FromStr;
use std::sync::Arc;

#[async_trait]
pub trait TradeExecutor: Send + Sync {
    /// Buy spends `amount` of the quote asset; sell sends `amount` of the
    /// base asset. Failures are reported in the receipt.
    async fn execute(&self, side: Side, amount: f64) -> TradeReceipt;
}

/// Signature of a submitted (or, in dry-run, simulated) transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub signature: String,
    pub simulated: bool,
}

pub struct LedgerTradeExecutor {
    rpc: Arc<dyn RpcClient>,
    signer: Arc<dyn TransactionSigner>,
    base_mint: Pubkey,
    counterparty: Pubkey,
    live: bool,
}

impl LedgerTradeExecutor {
    /// `live = false` simulates signed transactions instead of sending them.
    pub fn new(
        rpc: Arc<dyn RpcClient>,
        signer: Arc<dyn TransactionSigner>,
        base_mint: Pubkey,
        counterparty: Pubkey,
        live: bool,
    ) -> Self {
        Self { rpc, signer, base_mint, counterparty, live }
    }

    pub async fn submit(&self, side: Side, amount: f64) -> Result<Submitted, SubmissionError> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(SubmissionError::InvalidAmount(amount));
        }

        let instructions = match side {
            Side::Buy => vec![self.build_buy(amount)?],
            Side::Sell => vec![self.build_sell(amount).await?],
        };

        let blockhash = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| SubmissionError::Blockhash(e.to_string()))?;

        let signed = self
            .signer
            .sign_instructions(instructions, &blockhash)
            .await
            .map_err(|e| SubmissionError::Signing(e.to_string()))?;

        if self.live {
            let signature = self
                .rpc
                .send_transaction(&signed.bytes)
                .await
                .map_err(|e| SubmissionError::Rejected(e.to_string()))?;
            Ok(Submitted { signature, simulated: false })
        } else {
            self.rpc
                .simulate_transaction(&signed.bytes)
                .await
                .map_err(|e| SubmissionError::Rejected(e.to_string()))?;
            Ok(Submitted { signature: signed.signature, simulated: true })
        }
    }

    fn build_buy(&self, amount_sol: f64) -> Result<Instruction, SubmissionError> {
        let lamports = sol_to_lamports(amount_sol);
        if lamports == 0 {
            return Err(SubmissionError::InvalidAmount(amount_sol));
        }
        Ok(system_instruction::transfer(&self.signer.public_key(), &self.counterparty, lamports))
    }

    async fn build_sell(&self, amount_tokens: f64) -> Result<Instruction, SubmissionError> {
        let owner = self.signer.public_key();
        let accounts = self
            .rpc
            .get_token_accounts_by_owner(&owner.to_string(), &self.base_mint.to_string())
            .await
            .map_err(|e| SubmissionError::Build(e.to_string()))?;
        let source_str = accounts.first().ok_or_else(|| {
            SubmissionError::Build(format!("no token account for mint {}", self.base_mint))
        })?;
        let source = Pubkey::from_str(source_str)
            .map_err(|e| SubmissionError::Build(format!("Invalid token account: {}", e)))?;

        let held = self
            .rpc
            .get_token_account_balance(source_str)
            .await
            .map_err(|e| SubmissionError::Build(e.to_string()))?;
        let raw_amount = ui_to_base_units(amount_tokens, held.decimals);
        if raw_amount == 0 {
            return Err(SubmissionError::InvalidAmount(amount_tokens));
        }

        let destination = get_associated_token_address(&self.counterparty, &self.base_mint);
        spl_token::instruction::transfer(&spl_token::id(), &source, &destination, &owner, &[], raw_amount)
            .map_err(|e| SubmissionError::Build(format!("Failed to build token transfer: {}", e)))
    }
}

#[async_trait]
impl TradeExecutor for LedgerTradeExecutor {
    async fn execute(&self, side: Side, amount: f64) -> TradeReceipt {
        match self.submit(side, amount).await {
            Ok(sub) => {
                info!(
                    "{} of {} {} ({})",
                    side,
                    amount,
                    if sub.simulated { "simulated" } else { "sent" },
                    sub.signature
                );
                TradeReceipt::success(side, sub.signature, sub.simulated)
            }
            Err(e) => {
                warn!("{} of {} failed: {}", side, amount, e);
                TradeReceipt::failure(side, e.to_string())
            }
        }
    }
}
