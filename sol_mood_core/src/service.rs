// Trading service: one decision cycle per call
// Each read is bounded by the per-fetch timeout; an expired read is a
// FetchError::Timeout like any other fetch failure. The three reads of
// auto_trade run concurrently and share no state.

use crate::balance::BalanceReader;
use crate::decision::DecisionPolicy;
use crate::error::{DataSource, FetchError};
use crate::executor::TradeExecutor;
use crate::models::{Balance, Quote, SentimentScore, Side, TradeDecision, TradeReceipt};
use crate::price_feed::PriceFeed;
use crate::sentiment::SentimentSource;
use crate::settings::Settings;
use log::{debug, info, warn};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of one automated cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub decision: TradeDecision,
    pub receipt: Option<TradeReceipt>,
}

/// Amounts used for each side of a trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeSizes {
    /// SOL spent per buy.
    pub buy_amount: f64,
    /// Base tokens sent per sell.
    pub sell_amount: f64,
}

impl TradeSizes {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            buy_amount: settings.trade_amount_sol,
            sell_amount: settings.sell_amount_tokens,
        }
    }

    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::Buy => self.buy_amount,
            Side::Sell => self.sell_amount,
        }
    }
}

pub struct TradingService {
    price_feed: Arc<dyn PriceFeed>,
    sentiment: Arc<dyn SentimentSource>,
    balances: Arc<dyn BalanceReader>,
    executor: Arc<dyn TradeExecutor>,
    policy: DecisionPolicy,
    sizes: TradeSizes,
    fetch_timeout: Duration,
}

async fn with_timeout<T, F>(source: DataSource, limit: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(FetchError::Timeout(source, limit)),
    }
}

fn log_fetch<T>(res: &Result<T, FetchError>) {
    if let Err(e) = res {
        warn!("Fetch failed: {}", e);
    }
}

impl TradingService {
    /// The policy's `trade_size` is replaced by `sizes.buy_amount`, so a buy
    /// is only decided when the wallet holds what the executor will spend.
    pub fn new(
        price_feed: Arc<dyn PriceFeed>,
        sentiment: Arc<dyn SentimentSource>,
        balances: Arc<dyn BalanceReader>,
        executor: Arc<dyn TradeExecutor>,
        policy: DecisionPolicy,
        sizes: TradeSizes,
        fetch_timeout: Duration,
    ) -> Self {
        let policy = DecisionPolicy {
            trade_size: sizes.buy_amount,
            ..policy
        };
        Self {
            price_feed,
            sentiment,
            balances,
            executor,
            policy,
            sizes,
            fetch_timeout,
        }
    }

    pub fn pair(&self) -> &str {
        self.price_feed.pair()
    }

    pub async fn price(&self) -> Result<Quote, FetchError> {
        let res = with_timeout(DataSource::Price, self.fetch_timeout, self.price_feed.fetch_quote()).await;
        log_fetch(&res);
        res
    }

    pub async fn sentiment(&self) -> Result<SentimentScore, FetchError> {
        let res = with_timeout(DataSource::Sentiment, self.fetch_timeout, self.sentiment.fetch_sentiment()).await;
        log_fetch(&res);
        res
    }

    pub async fn balance(&self) -> Result<Balance, FetchError> {
        let res = with_timeout(DataSource::Balance, self.fetch_timeout, self.balances.fetch_balance()).await;
        log_fetch(&res);
        res
    }

    /// Submit one trade of the configured size for `side`.
    pub async fn trade(&self, side: Side) -> TradeReceipt {
        let amount = self.sizes.for_side(side);
        info!("Executing {} of {}", side, amount);
        self.executor.execute(side, amount).await
    }

    pub async fn auto_trade(&self) -> CycleReport {
        let (quote, sentiment, balance) = tokio::join!(self.price(), self.sentiment(), self.balance());
        let decision = self.policy.decide(&quote, &sentiment, &balance);
        debug!(
            "Cycle inputs: quote={:?} sentiment={:?} balance={:?} -> {:?}",
            quote.as_ref().map(|q| q.rate),
            sentiment.as_ref().map(|s| s.value()),
            balance.as_ref().ok(),
            decision
        );

        let receipt = match decision.side() {
            Some(side) => Some(self.trade(side).await),
            None => {
                info!("No trade: {}", decision.reason);
                None
            }
        };
        CycleReport { decision, receipt }
    }
}
