use std::time::Duration;

use async_trait::async_trait;

use crate::{Bar, EvaluationResult, Result};

/// Source of historical OHLCV bars.
///
/// `YahooClient` in `crates/engine` implements this for live polling.
/// Tests substitute an in-memory fake.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch bars for `ticker` covering the last `lookback`, one bar per
    /// `bar_interval`. Bars are returned oldest first with strictly increasing
    /// timestamps.
    async fn fetch(&self, ticker: &str, lookback: Duration, bar_interval: Duration)
        -> Result<Vec<Bar>>;
}

/// Delivers a plain-text message to a destination channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: &str, text: &str) -> Result<()>;
}

/// Durable append-only record of evaluation results.
///
/// Only the poller writes to it, one result at a time.
pub trait RunLog: Send + Sync {
    fn append(&self, result: &EvaluationResult) -> Result<()>;
}
