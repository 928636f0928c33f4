use std::sync::Arc;

use tracing::{debug, error, info, warn};

use common::{Config, CycleReport, MarketDataProvider, Notifier, Result, RunLog};
use signals::SignalEvaluator;

/// What happened to one ticker in one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerOutcome {
    /// Too few bars; nothing journaled, nothing sent.
    Insufficient,
    /// Journaled with a zero score.
    Quiet,
    /// Journaled and the alert went out.
    Alerted,
    /// Journaled but the alert could not be delivered.
    AlertFailed,
}

/// Drives the fetch → evaluate → journal → notify cycle over the watchlist.
///
/// `tick` runs one cycle and is what tests exercise; `run` schedules ticks
/// forever, sleeping `check_interval` between them.
#[derive(Clone)]
pub struct Poller {
    config: Arc<Config>,
    provider: Arc<dyn MarketDataProvider>,
    evaluator: Arc<SignalEvaluator>,
    journal: Arc<dyn RunLog>,
    notifier: Arc<dyn Notifier>,
}

impl Poller {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn MarketDataProvider>,
        evaluator: SignalEvaluator,
        journal: Arc<dyn RunLog>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            provider,
            evaluator: Arc::new(evaluator),
            journal,
            notifier,
        }
    }

    /// Run the polling loop. Never returns; call from `tokio::spawn` or race
    /// it against a shutdown signal.
    pub async fn run(self) {
        info!(
            tickers = ?self.config.tickers,
            interval_secs = self.config.check_interval.as_secs(),
            "Poller running"
        );

        loop {
            // Each cycle runs as its own task so a panic inside it is contained.
            let cycle = self.clone();
            match tokio::spawn(async move { cycle.tick().await }).await {
                Ok(_) => {}
                Err(e) if e.is_panic() => error!(error = %e, "Polling cycle panicked"),
                Err(e) => error!(error = %e, "Polling cycle aborted"),
            }

            debug!(secs = self.config.check_interval.as_secs(), "Sleeping until next cycle");
            tokio::time::sleep(self.config.check_interval).await;
        }
    }

    /// Process every configured ticker once, in order.
    /// A failing ticker is logged and skipped; the rest still run.
    pub async fn tick(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for ticker in &self.config.tickers {
            match self.process_ticker(ticker).await {
                Ok(TickerOutcome::Insufficient) => report.insufficient += 1,
                Ok(TickerOutcome::Quiet) => report.evaluated += 1,
                Ok(TickerOutcome::Alerted) => {
                    report.evaluated += 1;
                    report.alerts_sent += 1;
                }
                Ok(TickerOutcome::AlertFailed) => {
                    report.evaluated += 1;
                    report.alert_failures += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(ticker = %ticker, error = %e, "Skipping ticker this cycle");
                }
            }
        }

        info!(%report, "Polling cycle complete");
        report
    }

    /// Fetch, evaluate, journal and (on a positive score) notify for one ticker.
    ///
    /// Fetch and journal failures come back as `Err`. A failed notification is
    /// not an error: the result is already on disk.
    pub async fn process_ticker(&self, ticker: &str) -> Result<TickerOutcome> {
        let bars = self
            .provider
            .fetch(ticker, self.config.lookback, self.config.bar_interval)
            .await?;

        let Some(result) = self.evaluator.evaluate(ticker, &bars) else {
            debug!(ticker, bars = bars.len(), "Insufficient history, skipping");
            return Ok(TickerOutcome::Insufficient);
        };

        self.journal.append(&result)?;
        info!(
            ticker,
            price = result.price,
            ma = ?result.moving_average,
            volume = result.volume,
            avg_volume = result.average_volume,
            score = result.score(),
            "Evaluated"
        );

        if !result.is_signal() {
            return Ok(TickerOutcome::Quiet);
        }

        let text = result.alert_text();
        match self.notifier.send(&self.config.notifier_chat_id, &text).await {
            Ok(()) => Ok(TickerOutcome::Alerted),
            Err(e) => {
                warn!(ticker, error = %e, "Alert delivery failed");
                Ok(TickerOutcome::AlertFailed)
            }
        }
    }
}
