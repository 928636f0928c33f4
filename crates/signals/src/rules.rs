/// Indicator values at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub close: f64,
    pub moving_average: Option<f64>,
    pub volume: u64,
    /// Truncated trailing volume average; 0 when undefined.
    pub average_volume: u64,
}

/// The two most recent bars a rule looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorFrame {
    pub prev: Snapshot,
    pub latest: Snapshot,
}

/// A single signal condition.
///
/// Rules are independent: each inspects the frame on its own and, when it
/// fires, returns the human-readable reason that goes into the result.
pub trait SignalRule: Send + Sync {
    fn name(&self) -> &str;

    /// Returns `Some(reason)` when the rule triggers on this frame.
    fn check(&self, frame: &IndicatorFrame) -> Option<String>;
}

/// Close crosses from at-or-below the moving average to above it on the
/// latest bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakoutRule;

impl BreakoutRule {
    pub const REASON: &'static str = "price crossed above moving average";
}

impl SignalRule for BreakoutRule {
    fn name(&self) -> &str {
        "breakout"
    }

    fn check(&self, frame: &IndicatorFrame) -> Option<String> {
        let latest_ma = frame.latest.moving_average?;
        let prev_ma = frame.prev.moving_average?;

        if frame.latest.close > latest_ma && frame.prev.close <= prev_ma {
            Some(Self::REASON.to_string())
        } else {
            None
        }
    }
}

/// Latest volume at least `multiplier` times the trailing average.
#[derive(Debug, Clone, Copy)]
pub struct VolumeSpikeRule {
    pub multiplier: u64,
}

impl Default for VolumeSpikeRule {
    fn default() -> Self {
        Self { multiplier: 2 }
    }
}

impl SignalRule for VolumeSpikeRule {
    fn name(&self) -> &str {
        "volume_spike"
    }

    fn check(&self, frame: &IndicatorFrame) -> Option<String> {
        let Snapshot { volume, average_volume, .. } = frame.latest;
        if average_volume == 0 {
            return None;
        }

        if volume >= average_volume.saturating_mul(self.multiplier) {
            Some(format!(
                "volume {volume} >= {}x average ({average_volume})",
                self.multiplier
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(close: f64, ma: Option<f64>, volume: u64, average_volume: u64) -> Snapshot {
        Snapshot { close, moving_average: ma, volume, average_volume }
    }

    #[test]
    fn breakout_fires_on_cross_from_below() {
        let frame = IndicatorFrame {
            prev: snap(9.0, Some(9.95), 100, 100),
            latest: snap(12.0, Some(10.05), 100, 100),
        };
        assert_eq!(BreakoutRule.check(&frame).as_deref(), Some(BreakoutRule::REASON));
    }

    #[test]
    fn breakout_fires_when_prev_touches_average() {
        let frame = IndicatorFrame {
            prev: snap(10.0, Some(10.0), 100, 100),
            latest: snap(10.5, Some(10.1), 100, 100),
        };
        assert!(BreakoutRule.check(&frame).is_some());
    }

    #[test]
    fn breakout_silent_when_already_above() {
        let frame = IndicatorFrame {
            prev: snap(11.0, Some(10.0), 100, 100),
            latest: snap(12.0, Some(10.2), 100, 100),
        };
        assert!(BreakoutRule.check(&frame).is_none());
    }

    #[test]
    fn breakout_silent_without_averages() {
        let frame = IndicatorFrame {
            prev: snap(9.0, None, 100, 100),
            latest: snap(12.0, Some(10.0), 100, 100),
        };
        assert!(BreakoutRule.check(&frame).is_none());

        let frame = IndicatorFrame {
            prev: snap(9.0, Some(10.0), 100, 100),
            latest: snap(12.0, None, 100, 100),
        };
        assert!(BreakoutRule.check(&frame).is_none());
    }

    #[test]
    fn volume_spike_threshold_is_inclusive() {
        let rule = VolumeSpikeRule::default();
        let at = IndicatorFrame { prev: snap(1.0, None, 0, 0), latest: snap(1.0, None, 2000, 1000) };
        let below = IndicatorFrame { prev: snap(1.0, None, 0, 0), latest: snap(1.0, None, 1999, 1000) };
        assert_eq!(rule.check(&at).as_deref(), Some("volume 2000 >= 2x average (1000)"));
        assert!(rule.check(&below).is_none());
    }

    #[test]
    fn volume_spike_needs_positive_average() {
        let rule = VolumeSpikeRule::default();
        let frame = IndicatorFrame { prev: snap(1.0, None, 0, 0), latest: snap(1.0, None, 5000, 0) };
        assert!(rule.check(&frame).is_none());
    }
}
