use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as Base64Engine, Engine};

/// Environment variable prefix for overrides, e.g. `SOL_MOOD__TRADE_AMOUNT_SOL=0.02`.
pub const ENV_PREFIX: &str = "SOL_MOOD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Http,
    Static,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default = "default_solana_rpc_url")]
    pub solana_rpc_url: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_base_mint")]
    pub base_mint: String,
    pub counterparty_address: String,
    #[serde(default = "default_trade_amount_sol")]
    pub trade_amount_sol: f64,
    #[serde(default = "default_sell_amount_tokens")]
    pub sell_amount_tokens: f64,
    #[serde(default = "default_sentiment_threshold")]
    pub sentiment_buy_threshold: f64,
    #[serde(default = "default_sentiment_threshold")]
    pub sentiment_sell_threshold: f64,
    #[serde(default = "default_sentiment_posts")]
    pub sentiment_posts: Vec<String>,
    #[serde(default = "default_price_source")]
    pub price_source: PriceSource,
    #[serde(default = "default_price_api_url")]
    pub price_api_url: String,
    #[serde(default)]
    pub price_api_key: Option<String>,
    #[serde(default)]
    pub price_fallback: Option<f64>,
    #[serde(default = "default_static_price")]
    pub static_price: f64,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_api_host")]
    pub api_host: String,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default)]
    pub wallet_keypair_path: Option<String>,
    #[serde(default)]
    pub wallet_private_key_string: Option<String>,
}

impl Settings {
    pub fn from_file(path: &str) -> Result<Self, CoreError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );
        let cfg = builder.build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CoreError> {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(s, config::FileFormat::Toml))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    /// TOML rendering with wallet secrets and the price API key blanked out.
    pub fn to_redacted_toml(&self) -> Result<String, CoreError> {
        let mut copy = self.clone();
        let redact = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some("<redacted>".to_string());
            }
        };
        redact(&mut copy.wallet_private_key_string);
        redact(&mut copy.price_api_key);
        Ok(toml::to_string(&copy)?)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn base_mint_pubkey(&self) -> Result<Pubkey, CoreError> {
        Pubkey::from_str(&self.base_mint)
            .map_err(|e| CoreError::Validation(format!("Invalid base_mint: {}", e)))
    }

    pub fn counterparty_pubkey(&self) -> Result<Pubkey, CoreError> {
        Pubkey::from_str(&self.counterparty_address)
            .map_err(|e| CoreError::Validation(format!("Invalid counterparty_address: {}", e)))
    }

    /// Validate settings ranges and constraints
    pub fn validate(&self) -> Result<(), CoreError> {
        url::Url::parse(&self.solana_rpc_url)
            .map_err(|e| CoreError::Validation(format!("solana_rpc_url is not a valid URL: {}", e)))?;
        self.base_mint_pubkey()?;
        self.counterparty_pubkey()?;
        if !(self.trade_amount_sol.is_finite() && self.trade_amount_sol > 0.0) {
            return Err(CoreError::Validation("trade_amount_sol must be > 0".to_string()));
        }
        if !(self.sell_amount_tokens.is_finite() && self.sell_amount_tokens > 0.0) {
            return Err(CoreError::Validation("sell_amount_tokens must be > 0".to_string()));
        }
        for (name, value) in [
            ("sentiment_buy_threshold", self.sentiment_buy_threshold),
            ("sentiment_sell_threshold", self.sentiment_sell_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Validation(format!("{} must be within [0, 1]", name)));
            }
        }
        if self.fetch_timeout_secs == 0 {
            return Err(CoreError::Validation("fetch_timeout_secs must be > 0".to_string()));
        }
        match self.price_source {
            PriceSource::Http => {
                url::Url::parse(&self.price_api_url).map_err(|e| {
                    CoreError::Validation(format!("price_api_url is not a valid URL: {}", e))
                })?;
            }
            PriceSource::Static => {
                if !(self.static_price.is_finite() && self.static_price > 0.0) {
                    return Err(CoreError::Validation("static_price must be > 0".to_string()));
                }
            }
        }
        if let Some(fallback) = self.price_fallback {
            if !(fallback.is_finite() && fallback > 0.0) {
                return Err(CoreError::Validation("price_fallback must be > 0".to_string()));
            }
        }
        Ok(())
    }
}

/// Try to read a base64-encoded keypair from the given env var. Returns
/// the raw decoded bytes if present and valid, otherwise None.
pub fn load_keypair_from_env_var(var: &str) -> Option<Vec<u8>> {
    let s = std::env::var(var).ok()?;
    match Base64Engine.decode(s.trim()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("Failed to decode {}: {}", var, e);
            None
        }
    }
}

/// Parse a private key string in various formats:
/// - Base58 (Phantom export format, 87-88 chars)
/// - JSON array string like "[1,2,3,...]"
/// - Comma-separated bytes like "1,2,3,..."
pub fn parse_private_key_string(s: &str) -> Result<Vec<u8>, String> {
    let trimmed = s.trim();

    if trimmed.len() >= 80 && !trimmed.starts_with('[') && !trimmed.contains(',') {
        return bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| format!("Base58 decode failed: {}", e));
    }

    if trimmed.starts_with('[') {
        return serde_json::from_str::<Vec<u8>>(trimmed)
            .map_err(|e| format!("JSON parse failed: {}", e));
    }

    if trimmed.contains(',') {
        let parts: Result<Vec<u8>, _> = trimmed
            .split(',')
            .map(|s| s.trim().parse::<u8>())
            .collect();
        return parts.map_err(|e| format!("CSV parse failed: {}", e));
    }

    Err("Unrecognized private key format. Expected: base58, JSON array, or comma-separated bytes".to_string())
}

fn default_solana_rpc_url() -> String { "https://api.mainnet-beta.solana.com".to_string() }
fn default_symbol() -> String { "SRM/SOL".to_string() }
fn default_base_mint() -> String { "SRMuApVNdxXokk5GT7XD5cUUgXMBCoAz2LHeuAoKWRt".to_string() }
fn default_trade_amount_sol() -> f64 { 0.01 }
fn default_sell_amount_tokens() -> f64 { 0.1 }
fn default_sentiment_threshold() -> f64 { 0.2 }
fn default_sentiment_posts() -> Vec<String> {
    vec![
        "SRM is pumping!".to_string(),
        "Sell this junk".to_string(),
        "To the moon!".to_string(),
    ]
}
fn default_price_source() -> PriceSource { PriceSource::Http }
fn default_price_api_url() -> String { "https://public-api.birdeye.so/defi/price".to_string() }
fn default_static_price() -> f64 { 0.05 }
fn default_fetch_timeout_secs() -> u64 { 10 }
fn default_api_host() -> String { "0.0.0.0".to_string() }
fn default_api_port() -> u16 { 8080 }

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTERPARTY: &str = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM";

    fn minimal() -> Settings {
        Settings::from_toml_str(&format!("counterparty_address = \"{}\"", COUNTERPARTY)).unwrap()
    }

    #[test]
    fn defaults_fill_unspecified_fields() {
        let s = minimal();
        assert_eq!(s.symbol, "SRM/SOL");
        assert_eq!(s.trade_amount_sol, 0.01);
        assert_eq!(s.sentiment_buy_threshold, 0.2);
        assert_eq!(s.sentiment_sell_threshold, 0.2);
        assert_eq!(s.sentiment_posts.len(), 3);
        assert_eq!(s.price_source, PriceSource::Http);
        assert_eq!(s.api_port, 8080);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn overrides_are_read_from_toml() {
        let s = Settings::from_toml_str(&format!(
            r#"
            counterparty_address = "{}"
            trade_amount_sol = 0.5
            sentiment_buy_threshold = 0.4
            price_source = "static"
            static_price = 1.25
            sentiment_posts = ["gm"]
            "#,
            COUNTERPARTY
        ))
        .unwrap();
        assert_eq!(s.trade_amount_sol, 0.5);
        assert_eq!(s.sentiment_buy_threshold, 0.4);
        assert_eq!(s.price_source, PriceSource::Static);
        assert_eq!(s.static_price, 1.25);
        assert_eq!(s.sentiment_posts, vec!["gm".to_string()]);
    }

    #[test]
    fn missing_counterparty_is_an_error() {
        assert!(Settings::from_toml_str("symbol = \"X/SOL\"").is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut s = minimal();
        s.trade_amount_sol = 0.0;
        assert!(s.validate().is_err());

        let mut s = minimal();
        s.sentiment_sell_threshold = 1.5;
        assert!(s.validate().is_err());

        let mut s = minimal();
        s.counterparty_address = "RaydiumPoolAddressHere".to_string();
        assert!(s.validate().is_err());

        let mut s = minimal();
        s.solana_rpc_url = "not a url".to_string();
        assert!(s.validate().is_err());

        let mut s = minimal();
        s.fetch_timeout_secs = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn redacted_toml_hides_secrets() {
        let mut s = minimal();
        s.wallet_private_key_string = Some("supersecret".to_string());
        let rendered = s.to_redacted_toml().unwrap();
        assert!(!rendered.contains("supersecret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn from_file_reads_toml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!("counterparty_address = \"{}\"\nsymbol = \"BONK/SOL\"\n", COUNTERPARTY),
        )
        .unwrap();
        let s = Settings::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(s.symbol, "BONK/SOL");
    }

    #[test]
    fn example_config_loads_and_validates() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.example.toml");
        let s = Settings::from_file(path).unwrap();
        assert_eq!(s.counterparty_address, COUNTERPARTY);
        assert_eq!(s.base_mint, default_base_mint());
        s.validate().unwrap();
    }

    #[test]
    fn environment_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!("counterparty_address = \"{}\"\ntrade_amount_sol = 0.01\n", COUNTERPARTY),
        )
        .unwrap();

        std::env::set_var("SOL_MOOD__TRADE_AMOUNT_SOL", "0.25");
        let loaded = Settings::from_file(path.to_str().unwrap());
        std::env::remove_var("SOL_MOOD__TRADE_AMOUNT_SOL");

        let s = loaded.unwrap();
        assert_eq!(s.trade_amount_sol, 0.25);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn parses_private_key_formats() {
        assert_eq!(parse_private_key_string("[1, 2, 3]").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_private_key_string("4,5,6").unwrap(), vec![4, 5, 6]);
        let encoded = bs58::encode(vec![7u8; 64]).into_string();
        assert_eq!(parse_private_key_string(&encoded).unwrap(), vec![7u8; 64]);
        assert!(parse_private_key_string("nope").is_err());
    }
}
