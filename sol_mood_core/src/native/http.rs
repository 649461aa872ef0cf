// Native HTTP client implementation using reqwest

use crate::http_client::{HttpClient, HttpError};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

/// Native HTTP client using reqwest
pub struct NativeHttpClient {
    client: Client,
}

impl NativeHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for NativeHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for NativeHttpClient {
    async fn get_json(&self, url: &str, headers: &[(&str, &str)]) -> Result<Value, HttpError> {
        debug!("Fetching URL: {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| HttpError::Body(e.to_string()))
    }
}
