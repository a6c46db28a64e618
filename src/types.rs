//! Core value types for the Kinecal pipeline
//!
//! These are the types that flow between the stages: raw samples feed the
//! analyzer, which emits peaks; the session snapshot carries sorted peak
//! sequences; thresholds and trial counters drive live classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Running bounds over all samples seen in a session.
///
/// `min` only decreases and `max` only increases; both start at zero and are
/// cleared only by an explicit analyzer reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Widen the bounds to include `v`.
    pub fn update(&mut self, v: f32) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} ... {:.4}", self.min, self.max)
    }
}

/// A detected local extremum in the sample stream.
///
/// `value` is the sample at the direction reversal; `step` is the number of
/// samples since the previously detected extremum. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub value: f32,
    pub step: u32,
}

/// Which side of the reference threshold a peak was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

/// A peak paired with its polarity, as emitted by the analyzer and forwarded
/// synchronously to the trial classifier and session listener.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakEvent {
    pub polarity: Polarity,
    pub peak: Peak,
}

/// Four independent classification cut values derived from a calibration run.
///
/// The all-zero instance is the "empty" sentinel; it is distinct from a
/// "no data" absence (`None`) at the persistence boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub neg_hit: f32,
    pub neg_med: f32,
    pub pos_hit: f32,
    pub pos_med: f32,
}

impl ThresholdSet {
    /// The empty sentinel.
    pub const EMPTY: ThresholdSet = ThresholdSet {
        neg_hit: 0.0,
        neg_med: 0.0,
        pos_hit: 0.0,
        pos_med: 0.0,
    };

    pub fn is_empty(&self) -> bool {
        self.neg_hit == 0.0 && self.neg_med == 0.0 && self.pos_hit == 0.0 && self.pos_med == 0.0
    }
}

/// Live hit / near-miss counts accumulated by the trial classifier.
/// Increment-only; reset together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialCounters {
    pub neg_hit: u32,
    pub neg_med: u32,
    pub pos_hit: u32,
    pub pos_med: u32,
}

impl TrialCounters {
    pub fn reset(&mut self) {
        *self = TrialCounters::default();
    }
}

/// Calibration session state.
///
/// `Observing` is re-enterable from either terminal state via `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Init,
    Observing,
    HasResult,
    Error,
}
