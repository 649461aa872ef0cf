// Transaction signing abstraction
// The executor hands over instructions plus a recent blockhash and gets back
// a serialized, signed transaction ready for the RPC node

use crate::error::CoreError;
use async_trait::async_trait;
use solana_program::hash::Hash;
use solana_program::instruction::Instruction;
use solana_program::pubkey::Pubkey;
use solana_sdk::{
    message::Message,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::str::FromStr;

pub type SignerResult<T> = Result<T, CoreError>;

/// A signed transaction together with its (first) signature.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub signature: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Get the public key of this signer
    fn public_key(&self) -> Pubkey;

    /// Sign a list of instructions with `recent_blockhash`, paying fees from
    /// this signer's account
    async fn sign_instructions(
        &self,
        instructions: Vec<Instruction>,
        recent_blockhash: &str,
    ) -> SignerResult<SignedTransaction>;
}

/// Signs with a keypair held in process memory.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    fn public_key(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_instructions(
        &self,
        instructions: Vec<Instruction>,
        recent_blockhash: &str,
    ) -> SignerResult<SignedTransaction> {
        let blockhash = Hash::from_str(recent_blockhash)
            .map_err(|e| CoreError::Validation(format!("Invalid blockhash: {}", e)))?;

        let message = Message::new(&instructions, Some(&self.keypair.pubkey()));
        let tx = Transaction::new(&[&self.keypair], message, blockhash);

        let signature = tx
            .signatures
            .first()
            .map(|s| s.to_string())
            .ok_or_else(|| CoreError::Validation("Signed transaction has no signature".to_string()))?;
        let bytes = bincode::serialize(&tx)
            .map_err(|e| CoreError::Validation(format!("Failed to serialize transaction: {}", e)))?;

        Ok(SignedTransaction { signature, bytes })
    }
}
