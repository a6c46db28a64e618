//! Live trial classification
//!
//! Once a threshold set has been registered, every peak coming out of the
//! analyzer is counted against it immediately, giving a running tally of how
//! many subsequent events would classify as genuine jumps (hit) versus
//! borderline events (near-miss) without re-running the batch pass.

use crate::types::{PeakEvent, Polarity, ThresholdSet, TrialCounters};

/// Counts hits and near-misses under the currently registered thresholds.
///
/// The positive near-miss counter is not gated by `enabled`; the negative
/// counters are. This asymmetry is part of the classification contract.
#[derive(Debug, Clone, Default)]
pub struct TrialClassifier {
    enabled: bool,
    thresholds: ThresholdSet,
    counters: TrialCounters,
}

impl TrialClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a threshold set and enable classification.
    pub fn set_thresholds(&mut self, thresholds: ThresholdSet) {
        self.thresholds = thresholds;
        self.enabled = true;
    }

    /// Zero the counters. The threshold set and the enabled flag are kept.
    pub fn reset(&mut self) {
        self.counters.reset();
    }

    /// Classify one peak, updating the counters.
    pub fn on_peak(&mut self, event: PeakEvent) {
        let v = event.peak.value;
        match event.polarity {
            Polarity::Positive => {
                if self.enabled && v > self.thresholds.pos_hit {
                    self.counters.pos_hit += 1;
                }
                if v > self.thresholds.pos_med {
                    self.counters.pos_med += 1;
                }
            }
            Polarity::Negative => {
                if self.enabled {
                    if v < self.thresholds.neg_hit {
                        self.counters.neg_hit += 1;
                    }
                    if v < self.thresholds.neg_med {
                        self.counters.neg_med += 1;
                    }
                }
            }
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds
    }

    pub fn counters(&self) -> TrialCounters {
        self.counters
    }
}
