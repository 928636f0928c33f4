use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar for a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Start of the interval the bar covers.
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Outcome of evaluating one ticker in one polling cycle.
///
/// The score is not stored: it is the number of triggered reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub ticker: String,
    /// Close of the latest bar.
    pub price: f64,
    /// Trailing close average at the latest bar. `None` when the window is
    /// not yet filled.
    pub moving_average: Option<f64>,
    /// Latest bar volume, truncated.
    pub volume: u64,
    /// Trailing volume average at the latest bar, truncated. 0 when undefined.
    pub average_volume: u64,
    pub reasons: Vec<String>,
    /// Wall-clock time of the evaluation, not the bar time.
    pub timestamp: DateTime<Utc>,
}

impl EvaluationResult {
    pub fn new(
        ticker: impl Into<String>,
        price: f64,
        moving_average: Option<f64>,
        volume: u64,
        average_volume: u64,
        reasons: Vec<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            moving_average,
            volume,
            average_volume,
            reasons,
            timestamp,
        }
    }

    /// Count of triggered rules.
    pub fn score(&self) -> u32 {
        self.reasons.len() as u32
    }

    pub fn is_signal(&self) -> bool {
        !self.reasons.is_empty()
    }

    /// Text pushed to the notifier when the score is positive.
    pub fn alert_text(&self) -> String {
        format!(
            "[RAKET-SIGNAL] {} | price {:.2} | score {} | {}",
            self.ticker,
            self.price,
            self.score(),
            self.reasons.join("; ")
        )
    }
}

/// Per-cycle summary returned by the poller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Tickers that produced a result and were journaled.
    pub evaluated: usize,
    /// Tickers skipped for lack of history.
    pub insufficient: usize,
    /// Tickers whose fetch or journal write failed.
    pub failed: usize,
    pub alerts_sent: usize,
    pub alert_failures: usize,
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "evaluated={} insufficient={} failed={} alerts={} alert_failures={}",
            self.evaluated, self.insufficient, self.failed, self.alerts_sent, self.alert_failures
        )
    }
}
