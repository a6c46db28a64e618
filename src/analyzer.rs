//! Streaming peak detection
//!
//! The analyzer consumes one sample at a time and recognizes local extrema as
//! sign reversals of the sample-to-sample delta, gated by a noise floor and a
//! short warm-up. Detected peaks are appended to per-polarity sequences and
//! returned to the caller for synchronous forwarding.

use crate::types::{Peak, PeakEvent, Polarity, Range};

/// Reference level separating positive (airborne) from negative (landing)
/// extrema.
pub const VALUE_THRESHOLD: f32 = 0.5;

/// Minimum sample-to-sample delta considered a real direction change.
pub const DELTA_THRESHOLD: f32 = 0.01;

fn sign(v: f32) -> i32 {
    if v < 0.0 {
        -1
    } else {
        1
    }
}

/// On-line extremum detector over a scalar sample stream.
///
/// `update` must be called strictly sequentially with at most one call in
/// flight: each call reads and mutates the previous-value/previous-delta
/// state, so concurrent or reordered calls corrupt the reversal detection.
/// NaN samples are a caller contract violation and must be rejected or
/// normalized before this boundary.
#[derive(Debug, Clone, Default)]
pub struct PeakAnalyzer {
    prev_value: f32,
    prev_delta: f32,
    step: u32,
    total_count: u32,
    range: Range,
    positive: Vec<Peak>,
    negative: Vec<Peak>,
}

impl PeakAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all analyzer state back to the zero/empty values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Consume one sample; returns the detected peak, if any.
    pub fn update(&mut self, v: f32) -> Option<PeakEvent> {
        self.range.update(v);

        if self.total_count == 0 {
            self.prev_value = v;
            self.step = 0;
            self.total_count += 1;
            return None;
        }

        self.step += 1;
        let delta = v - self.prev_value;
        let mut event = None;

        // A reversal needs a delta above the noise floor, a completed warm-up
        // and a sign change against the previous segment's direction.
        if delta.abs() > DELTA_THRESHOLD
            && self.total_count > 2
            && sign(delta) != sign(self.prev_delta)
        {
            if sign(self.prev_delta) > 0 {
                if self.prev_value > VALUE_THRESHOLD {
                    let peak = Peak {
                        value: v,
                        step: self.step,
                    };
                    self.positive.push(peak);
                    event = Some(PeakEvent {
                        polarity: Polarity::Positive,
                        peak,
                    });
                }
            } else if self.prev_value < VALUE_THRESHOLD {
                let peak = Peak {
                    value: v,
                    step: self.step,
                };
                self.negative.push(peak);
                event = Some(PeakEvent {
                    polarity: Polarity::Negative,
                    peak,
                });
            }
            self.step = 0;
        }

        self.prev_value = v;
        self.prev_delta = delta;
        self.total_count += 1;
        event
    }

    /// Number of `update` calls since the last reset.
    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Peaks above the reference level, in arrival order.
    pub fn positive_peaks(&self) -> &[Peak] {
        &self.positive
    }

    /// Peaks below the reference level, in arrival order.
    pub fn negative_peaks(&self) -> &[Peak] {
        &self.negative
    }
}
