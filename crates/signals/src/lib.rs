pub mod evaluator;
pub mod indicators;
pub mod rules;

pub use evaluator::SignalEvaluator;
pub use rules::{BreakoutRule, IndicatorFrame, SignalRule, Snapshot, VolumeSpikeRule};
