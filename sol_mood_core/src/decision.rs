use crate::error::FetchError;
use crate::models::{Balance, DecisionReason, Quote, SentimentScore, TradeAction, TradeDecision};
use crate::settings::Settings;

/// Fixed thresholds the decision engine applies to every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    pub sentiment_buy_threshold: f64,
    pub sentiment_sell_threshold: f64,
    /// Quote-asset amount a buy would spend.
    pub trade_size: f64,
}

impl DecisionPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            sentiment_buy_threshold: settings.sentiment_buy_threshold,
            sentiment_sell_threshold: settings.sentiment_sell_threshold,
            trade_size: settings.trade_amount_sol,
        }
    }

    /// Decide what to do given the three reads of one cycle.
    ///
    /// Never fails: an unavailable input yields Hold. The quote only gates on
    /// availability; the policy itself is sentiment-driven.
    pub fn decide(
        &self,
        quote: &Result<Quote, FetchError>,
        sentiment: &Result<SentimentScore, FetchError>,
        balance: &Result<Balance, FetchError>,
    ) -> TradeDecision {
        let (sentiment, balance) = match (quote, sentiment, balance) {
            (Ok(_), Ok(s), Ok(b)) => (s.value(), b),
            _ => return TradeDecision::hold(DecisionReason::InputUnavailable),
        };

        if sentiment > self.sentiment_buy_threshold && balance.quote >= self.trade_size {
            TradeDecision {
                action: TradeAction::Buy,
                reason: DecisionReason::SentimentAboveThreshold,
            }
        } else if sentiment < -self.sentiment_sell_threshold && balance.base > 0.0 {
            TradeDecision {
                action: TradeAction::Sell,
                reason: DecisionReason::SentimentBelowThreshold,
            }
        } else {
            TradeDecision::hold(DecisionReason::NoSignal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataSource;
    use std::time::Duration;

    fn policy() -> DecisionPolicy {
        DecisionPolicy {
            sentiment_buy_threshold: 0.2,
            sentiment_sell_threshold: 0.2,
            trade_size: 0.01,
        }
    }

    fn quote() -> Result<Quote, FetchError> {
        Ok(Quote::new("SRM/SOL", 0.05).unwrap())
    }

    fn sentiment(v: f64) -> Result<SentimentScore, FetchError> {
        Ok(SentimentScore::new(v, 3))
    }

    fn balance(base: f64, quote: f64) -> Result<Balance, FetchError> {
        Ok(Balance { base, quote })
    }

    fn price_down() -> FetchError {
        FetchError::Network(DataSource::Price, "connection refused".to_string())
    }

    #[test]
    fn scenario_buy_on_positive_sentiment() {
        let d = policy().decide(&quote(), &sentiment(0.5), &balance(0.0, 1.0));
        assert_eq!(d.action, TradeAction::Buy);
        assert_eq!(d.reason, DecisionReason::SentimentAboveThreshold);
    }

    #[test]
    fn scenario_sell_blocked_by_empty_base_balance() {
        let d = policy().decide(&quote(), &sentiment(-0.5), &balance(0.0, 1.0));
        assert_eq!(d, TradeDecision::hold(DecisionReason::NoSignal));
    }

    #[test]
    fn scenario_neutral_sentiment_holds() {
        let d = policy().decide(&quote(), &sentiment(0.0), &balance(5.0, 5.0));
        assert_eq!(d, TradeDecision::hold(DecisionReason::NoSignal));
    }

    #[test]
    fn scenario_price_failure_holds() {
        let d = policy().decide(&Err(price_down()), &sentiment(0.9), &balance(1.0, 1.0));
        assert_eq!(d, TradeDecision::hold(DecisionReason::InputUnavailable));
    }

    #[test]
    fn sell_on_negative_sentiment_with_tokens() {
        let d = policy().decide(&quote(), &sentiment(-0.5), &balance(0.1, 0.0));
        assert_eq!(d.action, TradeAction::Sell);
        assert_eq!(d.reason, DecisionReason::SentimentBelowThreshold);
    }

    #[test]
    fn buy_requires_enough_quote_balance() {
        let d = policy().decide(&quote(), &sentiment(0.9), &balance(0.0, 0.009));
        assert_eq!(d, TradeDecision::hold(DecisionReason::NoSignal));

        // exactly the trade size is enough
        let d = policy().decide(&quote(), &sentiment(0.9), &balance(0.0, 0.01));
        assert_eq!(d.action, TradeAction::Buy);
    }

    #[test]
    fn thresholds_are_strict() {
        let d = policy().decide(&quote(), &sentiment(0.2), &balance(1.0, 1.0));
        assert_eq!(d.action, TradeAction::Hold);
        let d = policy().decide(&quote(), &sentiment(-0.2), &balance(1.0, 1.0));
        assert_eq!(d.action, TradeAction::Hold);
    }

    #[test]
    fn any_fetch_error_holds_regardless_of_other_inputs() {
        let sentiment_err = FetchError::Timeout(DataSource::Sentiment, Duration::from_secs(1));
        let balance_err = FetchError::Malformed(DataSource::Balance, "negative".to_string());
        let p = policy();
        for s in [-1.0, -0.5, 0.0, 0.5, 1.0] {
            for (base, q) in [(0.0, 0.0), (1.0, 1.0), (10.0, 0.001)] {
                let cases = [
                    p.decide(&Err(price_down()), &sentiment(s), &balance(base, q)),
                    p.decide(&quote(), &Err(sentiment_err.clone()), &balance(base, q)),
                    p.decide(&quote(), &sentiment(s), &Err(balance_err.clone())),
                    p.decide(&Err(price_down()), &Err(sentiment_err.clone()), &Err(balance_err.clone())),
                ];
                for d in cases {
                    assert_eq!(d, TradeDecision::hold(DecisionReason::InputUnavailable));
                }
            }
        }
    }

    #[test]
    fn decision_matches_policy_across_sweep() {
        let p = policy();
        let balances = [(0.0, 0.0), (0.0, 1.0), (2.0, 0.0), (2.0, 1.0), (1e-9, 0.01)];
        for i in -100..=100 {
            let s = i as f64 / 100.0;
            for (base, q) in balances {
                let d = p.decide(&quote(), &sentiment(s), &balance(base, q));
                let expected = if s > 0.2 && q >= 0.01 {
                    TradeAction::Buy
                } else if s < -0.2 && base > 0.0 {
                    TradeAction::Sell
                } else {
                    TradeAction::Hold
                };
                assert_eq!(d.action, expected, "s={} base={} quote={}", s, base, q);
                // identical inputs, identical output
                assert_eq!(d, p.decide(&quote(), &sentiment(s), &balance(base, q)));
            }
        }
    }

    #[test]
    fn policy_reads_thresholds_from_settings() {
        let settings = Settings::from_toml_str(
            r#"
            counterparty_address = "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM"
            sentiment_buy_threshold = 0.3
            sentiment_sell_threshold = 0.4
            trade_amount_sol = 0.5
            "#,
        )
        .unwrap();
        let p = DecisionPolicy::from_settings(&settings);
        assert_eq!(p.sentiment_buy_threshold, 0.3);
        assert_eq!(p.sentiment_sell_threshold, 0.4);
        assert_eq!(p.trade_size, 0.5);
    }
}
