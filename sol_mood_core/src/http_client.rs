// HTTP client abstraction so the price feed can be driven by reqwest in the
// binary and by canned responses in tests

use async_trait::async_trait;
use serde_json::Value;

/// Transport-level failure; callers decide which data source it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpError {
    Request(String),
    Status(u16),
    Body(String),
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Request(e) => write!(f, "HTTP request failed: {}", e),
            HttpError::Status(code) => write!(f, "HTTP status {}", code),
            HttpError::Body(e) => write!(f, "Failed to read response body: {}", e),
        }
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` with the given extra headers and decode the body as JSON.
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, HttpError>;
}
