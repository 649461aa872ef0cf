// Credential loading. The keypair is read once at startup and never rotated.

use crate::error::CoreError;
use crate::settings::{load_keypair_from_env_var, parse_private_key_string, Settings};
use log::{info, warn};
use solana_sdk::signature::{Keypair, Signer};

pub const KEYPAIR_B64_ENV: &str = "SOL_MOOD_KEYPAIR_B64";
pub const PRIVATE_KEY_ENV: &str = "PHANTOM_PRIVATE_KEY";

fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair, CoreError> {
    Keypair::try_from(bytes).map_err(|e| CoreError::InvalidKeypair(e.to_string()))
}

/// Resolve the configured wallet keypair, if any.
///
/// Order: base64 env var, Phantom-style private key env var, the
/// `wallet_private_key_string` setting, then `wallet_keypair_path`
/// (a JSON byte array as written by `solana-keygen`).
pub fn load_wallet_keypair(settings: &Settings) -> Result<Option<Keypair>, CoreError> {
    if let Some(bytes) = load_keypair_from_env_var(KEYPAIR_B64_ENV) {
        return keypair_from_bytes(&bytes).map(Some);
    }
    if let Ok(pk_string) = std::env::var(PRIVATE_KEY_ENV) {
        let bytes = parse_private_key_string(&pk_string).map_err(CoreError::InvalidKeypair)?;
        return keypair_from_bytes(&bytes).map(Some);
    }
    if let Some(pk_string) = settings.wallet_private_key_string.as_deref() {
        let bytes = parse_private_key_string(pk_string).map_err(CoreError::InvalidKeypair)?;
        return keypair_from_bytes(&bytes).map(Some);
    }
    if let Some(path) = settings.wallet_keypair_path.as_deref() {
        let contents = std::fs::read_to_string(path)?;
        let bytes: Vec<u8> = serde_json::from_str(contents.trim())?;
        return keypair_from_bytes(&bytes).map(Some);
    }
    Ok(None)
}

/// Live trading needs a real wallet; dry-run signs with an ephemeral key
/// when none is configured.
pub fn resolve_keypair(settings: &Settings, is_real: bool) -> Result<Keypair, CoreError> {
    match load_wallet_keypair(settings)? {
        Some(kp) => {
            info!("Loaded wallet keypair, pubkey: {}", kp.pubkey());
            Ok(kp)
        }
        None if is_real => Err(CoreError::InvalidKeypair(format!(
            "No wallet keypair configured! Set wallet_keypair_path, wallet_private_key_string, {} or {} env var",
            PRIVATE_KEY_ENV, KEYPAIR_B64_ENV
        ))),
        None => {
            let kp = Keypair::new();
            warn!("No wallet configured, dry-run will sign with ephemeral key {}", kp.pubkey());
            Ok(kp)
        }
    }
}
