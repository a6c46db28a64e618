//! Session result snapshot
//!
//! Once sampling stops, the accumulated analyzer state is frozen into an
//! immutable `SessionResult`: peak sequences sorted by value, the sample
//! count and observed range, and an availability verdict. The sorted order
//! ranks peaks by how jump-like they are, which is what the ranked `Detail`
//! window extraction relies on.

use crate::analyzer::PeakAnalyzer;
use crate::types::{Peak, Range};

/// A 3-wide window around a requested rank in a sorted peak sequence.
///
/// `hit` is the value at the rank itself; `min`/`max` are its neighbours
/// toward and away from the extreme end; `range` spans the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detail {
    pub min: f32,
    pub max: f32,
    pub hit: f32,
    pub range: Range,
}

impl Detail {
    pub const ZERO: Detail = Detail {
        min: 0.0,
        max: 0.0,
        hit: 0.0,
        range: Range { min: 0.0, max: 0.0 },
    };

    /// Midpoint of the window, used as the near-miss cut value.
    pub fn median(&self) -> f32 {
        (self.min + self.max) / 2.0
    }
}

/// Immutable snapshot of a completed observation session.
#[derive(Debug, Clone)]
pub struct SessionResult {
    negative: Vec<Peak>,
    positive: Vec<Peak>,
    total_count: u32,
    range: Range,
}

impl SessionResult {
    /// Freeze the analyzer state. Called exactly once per session, after the
    /// last sample has been delivered.
    pub fn build(analyzer: &PeakAnalyzer) -> Self {
        Self::from_parts(
            analyzer.negative_peaks().to_vec(),
            analyzer.positive_peaks().to_vec(),
            analyzer.total_count(),
            analyzer.range(),
        )
    }

    pub(crate) fn from_parts(
        mut negative: Vec<Peak>,
        mut positive: Vec<Peak>,
        total_count: u32,
        range: Range,
    ) -> Self {
        // Stable sorts keep arrival order for equal values.
        negative.sort_by(|a, b| a.value.total_cmp(&b.value));
        positive.sort_by(|a, b| b.value.total_cmp(&a.value));
        Self {
            negative,
            positive,
            total_count,
            range,
        }
    }

    /// Negative peaks sorted ascending, most negative first.
    pub fn negative_peaks(&self) -> &[Peak] {
        &self.negative
    }

    /// Positive peaks sorted descending, most positive first.
    pub fn positive_peaks(&self) -> &[Peak] {
        &self.positive
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Whether enough peaks were observed to derive thresholds.
    pub fn available(&self) -> bool {
        self.negative.len() >= 5 && self.positive.len() > 5
    }

    /// Largest rank the detail window can be anchored at.
    pub fn efficient_sample_count(&self) -> i32 {
        self.negative.len().min(self.positive.len()) as i32 - 1
    }

    /// Extract the 3-wide window centered on `rank` from the chosen sorted
    /// sequence. Returns the zero detail when the sequence is too short or
    /// the rank is below the valid window start; callers clamp `rank` to
    /// `[2, efficient_sample_count]` beforehand.
    pub fn detail(&self, rank: usize, positive: bool) -> Detail {
        let peaks = if positive { &self.positive } else { &self.negative };
        if rank < 2 || peaks.len() < rank + 1 {
            return Detail::ZERO;
        }
        Detail {
            min: peaks[rank - 2].value,
            max: peaks[rank].value,
            hit: peaks[rank - 1].value,
            range: Range::new(peaks[peaks.len() - 1].value, peaks[0].value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn peaks(values: &[f32]) -> Vec<Peak> {
        values.iter().map(|&value| Peak { value, step: 1 }).collect()
    }

    fn result(neg: &[f32], pos: &[f32]) -> SessionResult {
        SessionResult::from_parts(peaks(neg), peaks(pos), 100, Range::new(-3.0, 3.0))
    }

    #[test]
    fn test_sorting_most_extreme_first() {
        let r = result(&[-0.2, -2.0, -1.0], &[0.8, 2.5, 1.1]);

        let neg: Vec<f32> = r.negative_peaks().iter().map(|p| p.value).collect();
        assert_eq!(neg, vec![-2.0, -1.0, -0.2]);

        let pos: Vec<f32> = r.positive_peaks().iter().map(|p| p.value).collect();
        assert_eq!(pos, vec![2.5, 1.1, 0.8]);
    }

    #[test]
    fn test_sorting_ties_keep_arrival_order() {
        let neg = vec![
            Peak { value: -1.0, step: 3 },
            Peak { value: -1.0, step: 7 },
        ];
        let r = SessionResult::from_parts(neg, vec![], 10, Range::default());
        assert_eq!(r.negative_peaks()[0].step, 3);
        assert_eq!(r.negative_peaks()[1].step, 7);
    }

    #[test]
    fn test_availability_boundary() {
        // Exactly 5 negative and 6 positive peaks: available.
        assert!(result(&[-1.0; 5], &[1.0; 6]).available());
        // 4 negative peaks: below the negative bound.
        assert!(!result(&[-1.0; 4], &[1.0; 7]).available());
        // 5 positive peaks: the positive bound is exclusive.
        assert!(!result(&[-1.0; 5], &[1.0; 5]).available());
    }

    #[test]
    fn test_efficient_sample_count() {
        assert_eq!(result(&[-1.0; 5], &[1.0; 8]).efficient_sample_count(), 4);
        assert_eq!(result(&[-1.0; 9], &[1.0; 6]).efficient_sample_count(), 5);
        assert_eq!(result(&[], &[1.0; 6]).efficient_sample_count(), -1);
    }

    #[test]
    fn test_detail_window_extraction() {
        let r = result(
            &[-5.0, -4.0, -3.0, -2.0, -1.0, -0.8],
            &[6.0, 5.0, 4.0, 3.0, 2.0, 1.0],
        );

        let neg = r.detail(3, false);
        assert_eq!(neg.min, -4.0); // rank - 2
        assert_eq!(neg.hit, -3.0); // rank - 1
        assert_eq!(neg.max, -2.0); // rank
        assert_eq!(neg.range, Range::new(-0.8, -5.0));
        assert_eq!(neg.median(), -3.0);

        let pos = r.detail(3, true);
        assert_eq!(pos.min, 5.0);
        assert_eq!(pos.hit, 4.0);
        assert_eq!(pos.max, 3.0);
        assert_eq!(pos.range, Range::new(1.0, 6.0));
        assert_eq!(pos.median(), 4.0);
    }

    #[test]
    fn test_detail_zero_when_sequence_too_short() {
        let r = result(&[-3.0, -2.0, -1.0], &[3.0, 2.0, 1.0]);
        // len == 3 < rank + 1 == 4
        assert_eq!(r.detail(3, false), Detail::ZERO);
        assert_eq!(r.detail(3, true), Detail::ZERO);
        // rank 2 fits exactly
        assert_ne!(r.detail(2, false), Detail::ZERO);
    }

    #[test]
    fn test_detail_zero_for_invalid_rank() {
        let r = result(&[-3.0, -2.0, -1.0], &[3.0, 2.0, 1.0]);
        assert_eq!(r.detail(1, false), Detail::ZERO);
        assert_eq!(r.detail(0, true), Detail::ZERO);
    }

    #[test]
    fn test_build_freezes_analyzer_state() {
        let mut analyzer = PeakAnalyzer::new();
        for i in 0..30 {
            analyzer.update(((i as f32) * 0.9).sin() * 1.2);
        }
        let r = SessionResult::build(&analyzer);
        assert_eq!(r.total_count(), 30);
        assert_eq!(r.range(), analyzer.range());
        assert_eq!(
            r.negative_peaks().len(),
            analyzer.negative_peaks().len()
        );
        assert_eq!(
            r.positive_peaks().len(),
            analyzer.positive_peaks().len()
        );
    }
}
