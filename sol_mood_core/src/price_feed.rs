// Price feed: current exchange rate for the configured pair

use crate::error::{DataSource, FetchError};
use crate::http_client::{HttpClient, HttpError};
use crate::models::Quote;
use crate::settings::Settings;
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_quote(&self) -> Result<Quote, FetchError>;

    /// Pair identifier this feed quotes, e.g. `SRM/SOL`.
    fn pair(&self) -> &str;
}

/// Fixed-rate feed for offline runs and tests.
pub struct StaticPriceFeed {
    pair: String,
    rate: f64,
}

impl StaticPriceFeed {
    pub fn new(pair: impl Into<String>, rate: f64) -> Self {
        Self { pair: pair.into(), rate }
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn fetch_quote(&self) -> Result<Quote, FetchError> {
        Quote::new(self.pair.clone(), self.rate).ok_or_else(|| {
            FetchError::Malformed(DataSource::Price, format!("static rate {} is not positive", self.rate))
        })
    }

    fn pair(&self) -> &str {
        &self.pair
    }
}

/// Quotes the base mint from a Birdeye-style JSON endpoint:
/// `GET {url}?address={mint}` answering `{"data": {"value": <rate>}}`.
pub struct HttpPriceFeed<H: HttpClient> {
    http: H,
    pair: String,
    url: String,
    mint: String,
    api_key: Option<String>,
    fallback: Option<f64>,
}

impl<H: HttpClient> HttpPriceFeed<H> {
    pub fn new(http: H, settings: &Settings) -> Self {
        Self {
            http,
            pair: settings.symbol.clone(),
            url: settings.price_api_url.clone(),
            mint: settings.base_mint.clone(),
            api_key: settings.price_api_key.clone(),
            fallback: settings.price_fallback,
        }
    }

    fn request_url(&self) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}address={}", self.url, sep, self.mint)
    }
}

/// Pull the rate out of a price response body. A body without `data` falls
/// back to `fallback` when one is configured.
pub fn parse_price_response(body: &Value, fallback: Option<f64>) -> Result<f64, FetchError> {
    let Some(data) = body.get("data").filter(|d| !d.is_null()) else {
        return fallback.ok_or_else(|| {
            FetchError::Malformed(DataSource::Price, format!("no data in response: {}", body))
        });
    };
    data.get("value")
        .and_then(Value::as_f64)
        .ok_or_else(|| FetchError::Malformed(DataSource::Price, format!("missing data.value: {}", data)))
}

#[async_trait]
impl<H: HttpClient> PriceFeed for HttpPriceFeed<H> {
    async fn fetch_quote(&self) -> Result<Quote, FetchError> {
        let url = self.request_url();
        debug!("Fetching price from {}", url);

        let mut headers = vec![("accept", "application/json")];
        if let Some(key) = self.api_key.as_deref() {
            headers.push(("X-API-KEY", key));
        }

        let body = self.http.get_json(&url, &headers).await.map_err(|e| match e {
            HttpError::Body(detail) => FetchError::Malformed(DataSource::Price, detail),
            other => FetchError::Network(DataSource::Price, other.to_string()),
        })?;

        let rate = parse_price_response(&body, self.fallback)?;
        Quote::new(self.pair.clone(), rate).ok_or_else(|| {
            warn!("Price endpoint returned non-positive rate {}", rate);
            FetchError::Malformed(DataSource::Price, format!("rate {} is not positive", rate))
        })
    }

    fn pair(&self) -> &str {
        &self.pair
    }
}
