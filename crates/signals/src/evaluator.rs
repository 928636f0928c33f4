use chrono::Utc;
use tracing::debug;

use common::{Bar, EvaluationResult};

use crate::indicators::SmaIndicator;
use crate::rules::{BreakoutRule, IndicatorFrame, SignalRule, Snapshot, VolumeSpikeRule};

/// Turns a bar series for one ticker into an [`EvaluationResult`].
///
/// Holds no state between calls; the same bars always give the same result
/// apart from the evaluation timestamp.
pub struct SignalEvaluator {
    price_ma: SmaIndicator,
    volume_ma: SmaIndicator,
    /// Applied in order; the order fixes the order of reasons.
    rules: Vec<Box<dyn SignalRule>>,
}

impl SignalEvaluator {
    /// Evaluator with the standard rule set: breakout, then volume spike.
    pub fn new(ma_window: usize, vol_window: usize) -> Self {
        let rules: Vec<Box<dyn SignalRule>> =
            vec![Box::new(BreakoutRule), Box::new(VolumeSpikeRule::default())];
        Self::with_rules(ma_window, vol_window, rules)
    }

    pub fn with_rules(ma_window: usize, vol_window: usize, rules: Vec<Box<dyn SignalRule>>) -> Self {
        Self {
            price_ma: SmaIndicator::new(ma_window),
            volume_ma: SmaIndicator::new(vol_window),
            rules,
        }
    }

    /// Fewest bars needed to produce a result.
    pub fn min_bars(&self) -> usize {
        self.price_ma.window.max(self.volume_ma.window) + 2
    }

    /// Evaluate `bars` (oldest first). Returns `None` when there is not enough
    /// history.
    pub fn evaluate(&self, ticker: &str, bars: &[Bar]) -> Option<EvaluationResult> {
        if bars.len() < self.min_bars() {
            debug!(ticker, bars = bars.len(), needed = self.min_bars(), "Not enough bars to evaluate");
            return None;
        }

        let frame = self.frame(bars)?;

        let reasons: Vec<String> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let reason = rule.check(&frame)?;
                debug!(ticker, rule = rule.name(), %reason, "Rule triggered");
                Some(reason)
            })
            .collect();

        Some(EvaluationResult::new(
            ticker,
            frame.latest.close,
            frame.latest.moving_average,
            frame.latest.volume,
            frame.latest.average_volume,
            reasons,
            Utc::now(),
        ))
    }

    /// Indicator values for the last two bars.
    pub fn frame(&self, bars: &[Bar]) -> Option<IndicatorFrame> {
        if bars.len() < 2 {
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let price_ma = self.price_ma.compute(&closes);
        let volume_ma = self.volume_ma.compute(&volumes);

        let snapshot = |i: usize| Snapshot {
            close: closes[i],
            moving_average: price_ma[i],
            volume: volumes[i] as u64,
            average_volume: volume_ma[i].map(|v| v as u64).unwrap_or(0),
        };

        let n = bars.len();
        Some(IndicatorFrame {
            prev: snapshot(n - 2),
            latest: snapshot(n - 1),
        })
    }
}
