use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use log::{debug, info};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use sol_mood_core::{DecisionReason, Side, TradingService};

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum BotMode {
    DryRun,
    Real,
}

#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<TradingService>,
    pub mode: BotMode,
    pub wallet: String,
}

// Every endpoint answers 200; failures are described in the payload.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/price", get(price_handler))
        .route("/sentiment", get(sentiment_handler))
        .route("/balance", get(balance_handler))
        .route("/trade/:action", get(trade_handler))
        .route("/auto_trade", get(auto_trade_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "mode": state.mode,
        "wallet": state.wallet,
    }))
}

async fn price_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let symbol = state.service.pair().to_string();
    match state.service.price().await {
        Ok(quote) => Json(json!({ "symbol": symbol, "price": quote.rate })),
        Err(e) => Json(json!({
            "symbol": symbol,
            "price": null,
            "status": format!("Error fetching price: {}", e),
        })),
    }
}

async fn sentiment_handler(State(state): State<ApiState>) -> impl IntoResponse {
    match state.service.sentiment().await {
        Ok(score) => Json(json!({ "sentiment": score.value(), "samples": score.sample_size })),
        Err(e) => Json(json!({
            "sentiment": null,
            "status": format!("Error fetching sentiment: {}", e),
        })),
    }
}

async fn balance_handler(State(state): State<ApiState>) -> impl IntoResponse {
    match state.service.balance().await {
        Ok(balance) => Json(json!({ "baseAsset": balance.base, "quoteAsset": balance.quote })),
        Err(e) => Json(json!({ "status": format!("Error fetching balance: {}", e) })),
    }
}

async fn trade_handler(
    State(state): State<ApiState>,
    Path(action): Path<String>,
) -> impl IntoResponse {
    let side = match action.parse::<Side>() {
        Ok(side) => side,
        Err(e) => {
            debug!("Rejected trade request: {}", e);
            return Json(json!({ "status": "Invalid action" }));
        }
    };
    info!("Manual {} requested", side);
    let receipt = state.service.trade(side).await;
    Json(json!({
        "status": receipt.status_line(),
        "simulated": receipt.simulated,
        "transaction_id": receipt.transaction_id,
    }))
}

async fn auto_trade_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let report = state.service.auto_trade().await;
    let status = match (&report.receipt, report.decision.reason) {
        (Some(receipt), _) => receipt.status_line(),
        (None, DecisionReason::InputUnavailable) => "Auto trade skipped due to error".to_string(),
        (None, _) => "No trade: Sentiment or balance not favorable".to_string(),
    };
    Json(json!({
        "status": status,
        "action": report.decision.action,
        "reason": report.decision.reason,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sol_mood_core::{
        Balance, BalanceReader, DataSource, DecisionPolicy, FetchError, SentimentScore,
        SentimentSource, StaticPriceFeed, TradeExecutor, TradeReceipt, TradeSizes,
    };
    use std::sync::Mutex;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FixedSentiment(f64);

    #[async_trait]
    impl SentimentSource for FixedSentiment {
        async fn fetch_sentiment(&self) -> Result<SentimentScore, FetchError> {
            Ok(SentimentScore::new(self.0, 3))
        }
    }

    struct FixedBalance(Option<Balance>);

    #[async_trait]
    impl BalanceReader for FixedBalance {
        async fn fetch_balance(&self) -> Result<Balance, FetchError> {
            self.0
                .ok_or_else(|| FetchError::Network(DataSource::Balance, "rpc down".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<Side>>,
    }

    #[async_trait]
    impl TradeExecutor for RecordingExecutor {
        async fn execute(&self, side: Side, _amount: f64) -> TradeReceipt {
            self.calls.lock().unwrap().push(side);
            TradeReceipt::success(side, "5igSig".to_string(), true)
        }
    }

    fn router(sentiment: f64, balance: Option<Balance>, exec: Arc<RecordingExecutor>) -> Router {
        let service = TradingService::new(
            Arc::new(StaticPriceFeed::new("SRM/SOL", 0.05)),
            Arc::new(FixedSentiment(sentiment)),
            Arc::new(FixedBalance(balance)),
            exec,
            DecisionPolicy {
                sentiment_buy_threshold: 0.2,
                sentiment_sell_threshold: 0.2,
                trade_size: 0.01,
            },
            TradeSizes { buy_amount: 0.01, sell_amount: 0.1 },
            Duration::from_secs(5),
        );
        create_router(ApiState {
            service: Arc::new(service),
            mode: BotMode::DryRun,
            wallet: "Wallet111".to_string(),
        })
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn funded() -> Option<Balance> {
        Some(Balance { base: 2.0, quote: 1.0 })
    }

    #[tokio::test]
    async fn price_reports_symbol_and_rate() {
        let body = get_json(router(0.0, funded(), Default::default()), "/price").await;
        assert_eq!(body["symbol"], "SRM/SOL");
        assert_eq!(body["price"], 0.05);
    }

    #[tokio::test]
    async fn sentiment_and_balance_payloads() {
        let exec: Arc<RecordingExecutor> = Default::default();
        let body = get_json(router(0.4, funded(), exec.clone()), "/sentiment").await;
        assert_eq!(body["sentiment"], 0.4);
        assert_eq!(body["samples"], 3);

        let body = get_json(router(0.4, funded(), exec), "/balance").await;
        assert_eq!(body["baseAsset"], 2.0);
        assert_eq!(body["quoteAsset"], 1.0);
    }

    #[tokio::test]
    async fn balance_failure_is_still_200_with_status() {
        let body = get_json(router(0.0, None, Default::default()), "/balance").await;
        let status = body["status"].as_str().unwrap();
        assert!(status.starts_with("Error fetching balance:"), "{}", status);
    }

    #[tokio::test]
    async fn manual_trade_and_invalid_action() {
        let exec: Arc<RecordingExecutor> = Default::default();
        let body = get_json(router(0.0, funded(), exec.clone()), "/trade/buy").await;
        assert_eq!(body["status"], "Buy tx simulated: 5igSig");

        let body = get_json(router(0.0, funded(), exec.clone()), "/trade/hodl").await;
        assert_eq!(body["status"], "Invalid action");
        assert_eq!(*exec.calls.lock().unwrap(), vec![Side::Buy]);
    }

    #[tokio::test]
    async fn uppercase_action_is_rejected_without_trading() {
        let exec: Arc<RecordingExecutor> = Default::default();
        for uri in ["/trade/BUY", "/trade/Sell"] {
            let body = get_json(router(0.9, funded(), exec.clone()), uri).await;
            assert_eq!(body["status"], "Invalid action", "{}", uri);
        }
        assert!(exec.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn auto_trade_statuses() {
        let exec: Arc<RecordingExecutor> = Default::default();
        let body = get_json(router(0.9, funded(), exec.clone()), "/auto_trade").await;
        assert_eq!(body["status"], "Buy tx simulated: 5igSig");
        assert_eq!(body["action"], "buy");

        let body = get_json(router(0.0, funded(), exec.clone()), "/auto_trade").await;
        assert_eq!(body["status"], "No trade: Sentiment or balance not favorable");
        assert_eq!(body["reason"], "no_signal");

        let body = get_json(router(0.9, None, exec.clone()), "/auto_trade").await;
        assert_eq!(body["status"], "Auto trade skipped due to error");
        assert_eq!(body["action"], "hold");

        assert_eq!(*exec.calls.lock().unwrap(), vec![Side::Buy]);
    }

    #[tokio::test]
    async fn health_reports_mode() {
        let body = get_json(router(0.0, funded(), Default::default()), "/health").await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["mode"], "dry-run");
        assert_eq!(body["wallet"], "Wallet111");
    }
}
