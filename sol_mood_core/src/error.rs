use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which external read a [`FetchError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Price,
    Sentiment,
    Balance,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Price => write!(f, "price"),
            DataSource::Sentiment => write!(f, "sentiment"),
            DataSource::Balance => write!(f, "balance"),
        }
    }
}

/// Failure to obtain fresh data from an external source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("{0} request failed: {1}")]
    Network(DataSource, String),

    #[error("{0} fetch timed out after {1:?}")]
    Timeout(DataSource, Duration),

    #[error("{0} response malformed: {1}")]
    Malformed(DataSource, String),
}

/// The ledger rejected, or we could not relay, a transaction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmissionError {
    #[error("trade amount must be positive, got {0}")]
    InvalidAmount(f64),

    #[error("failed to get latest blockhash: {0}")]
    Blockhash(String),

    #[error("failed to build transfer: {0}")]
    Build(String),

    #[error("failed to sign transaction: {0}")]
    Signing(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid action: {0}")]
pub struct InvalidActionError(pub String);

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialization(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::TomlSerialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_names_its_source() {
        let err = FetchError::Timeout(DataSource::Balance, Duration::from_secs(3));
        assert_eq!(err.to_string(), "balance fetch timed out after 3s");
    }

    #[test]
    fn core_error_is_transparent_over_submission_errors() {
        let err: CoreError = SubmissionError::Rejected("blockhash not found".to_string()).into();
        assert_eq!(err.to_string(), "transaction rejected: blockhash not found");
    }
}
