use crate::error::InvalidActionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange rate for the configured pair, as returned by a price feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub pair: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Returns `None` unless `rate` is finite and strictly positive.
    pub fn new(pair: impl Into<String>, rate: f64) -> Option<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return None;
        }
        Some(Self {
            pair: pair.into(),
            rate,
            timestamp: Utc::now(),
        })
    }
}

/// Market mood in [-1, 1] summarised from `sample_size` texts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    value: f64,
    pub sample_size: usize,
}

impl SentimentScore {
    pub fn new(value: f64, sample_size: usize) -> Self {
        let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
        Self { value, sample_size }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Wallet holdings in UI units: base = the traded token, quote = SOL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    #[serde(rename = "baseAsset")]
    pub base: f64,
    #[serde(rename = "quoteAsset")]
    pub quote: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for Side {
    type Err = InvalidActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(InvalidActionError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    SentimentAboveThreshold,
    SentimentBelowThreshold,
    InputUnavailable,
    NoSignal,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::SentimentAboveThreshold => write!(f, "sentiment above buy threshold"),
            DecisionReason::SentimentBelowThreshold => write!(f, "sentiment below sell threshold"),
            DecisionReason::InputUnavailable => write!(f, "input unavailable"),
            DecisionReason::NoSignal => write!(f, "no signal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub action: TradeAction,
    pub reason: DecisionReason,
}

impl TradeDecision {
    pub fn hold(reason: DecisionReason) -> Self {
        Self { action: TradeAction::Hold, reason }
    }

    pub fn side(&self) -> Option<Side> {
        match self.action {
            TradeAction::Buy => Some(Side::Buy),
            TradeAction::Sell => Some(Side::Sell),
            TradeAction::Hold => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum TradeOutcome {
    Success,
    Failure(String),
}

/// Result of one submission attempt. The ledger stays the source of truth,
/// nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub side: Side,
    pub transaction_id: Option<String>,
    pub outcome: TradeOutcome,
    pub simulated: bool,
    pub timestamp: DateTime<Utc>,
}

impl TradeReceipt {
    pub fn success(side: Side, transaction_id: String, simulated: bool) -> Self {
        Self {
            side,
            transaction_id: Some(transaction_id),
            outcome: TradeOutcome::Success,
            simulated,
            timestamp: Utc::now(),
        }
    }

    pub fn failure(side: Side, detail: impl Into<String>) -> Self {
        Self {
            side,
            transaction_id: None,
            outcome: TradeOutcome::Failure(detail.into()),
            simulated: false,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == TradeOutcome::Success
    }

    /// Human-readable status line, e.g. `Buy tx sent: <sig>`.
    pub fn status_line(&self) -> String {
        let side = match self.side {
            Side::Buy => "Buy",
            Side::Sell => "Sell",
        };
        match (&self.outcome, &self.transaction_id) {
            (TradeOutcome::Success, Some(sig)) if self.simulated => format!("{} tx simulated: {}", side, sig),
            (TradeOutcome::Success, Some(sig)) => format!("{} tx sent: {}", side, sig),
            (TradeOutcome::Success, None) => format!("{} tx sent", side),
            (TradeOutcome::Failure(detail), _) => format!("Error executing {}: {}", self.side, detail),
        }
    }
}
