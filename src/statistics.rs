//! Threshold derivation and statistics formatting
//!
//! Given a frozen session result and a target rank, this stage derives the
//! four classification cut values and renders the fixed set of labelled
//! fields the display host shows. The field set is rebuilt from scratch on
//! every derive, never patched incrementally.

use crate::result::SessionResult;
use crate::types::ThresholdSet;
use std::collections::BTreeMap;

/// The fixed enumeration of report fields. Each kind carries a display label
/// and an integer order rank; the order ranks are part of the display
/// contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    TotalCount,
    Range,
    NegCount,
    NegRange,
    NegMin,
    NegMax,
    NegHit,
    NegMedian,
    PosCount,
    PosRange,
    PosMin,
    PosMax,
    PosHit,
    PosMedian,
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::TotalCount => "Total Samples",
            FieldKind::Range => "Value Range",
            FieldKind::NegCount => "- Peak Count",
            FieldKind::NegRange => "- Range",
            FieldKind::NegMin => "- Min",
            FieldKind::NegMax => "- Max",
            FieldKind::NegHit => "- Hit",
            FieldKind::NegMedian => "- Median",
            FieldKind::PosCount => "+ Peak Count",
            FieldKind::PosRange => "+ Range",
            FieldKind::PosMin => "+ Min",
            FieldKind::PosMax => "+ Max",
            FieldKind::PosHit => "+ Hit",
            FieldKind::PosMedian => "+ Median",
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            FieldKind::TotalCount => 10,
            FieldKind::Range => 20,
            FieldKind::NegCount => 110,
            FieldKind::NegRange => 120,
            FieldKind::NegMin => 130,
            FieldKind::NegMax => 140,
            FieldKind::NegHit => 150,
            FieldKind::NegMedian => 160,
            FieldKind::PosCount => 210,
            FieldKind::PosRange => 220,
            FieldKind::PosMin => 230,
            FieldKind::PosMax => 240,
            FieldKind::PosHit => 250,
            FieldKind::PosMedian => 260,
        }
    }
}

/// One formatted label/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    pub value: String,
}

impl Field {
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// The derived statistics: formatted fields in display order plus the
/// threshold set they imply.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    fields: BTreeMap<u32, Field>,
    thresholds: ThresholdSet,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, kind: FieldKind, value: String) {
        self.fields.insert(kind.order(), Field { kind, value });
    }

    /// Drop all fields and reset the thresholds to the empty sentinel.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.thresholds = ThresholdSet::EMPTY;
    }

    /// Rebuild everything from `result` at the given rank.
    ///
    /// On an unavailable result this leaves the statistics empty; that is the
    /// error path, not a panic. `rank` is expected to be clamped to
    /// `[2, efficient_sample_count]` by the caller.
    pub fn derive(&mut self, result: &SessionResult, rank: usize) {
        self.clear();
        if !result.available() {
            return;
        }

        let neg = result.detail(rank, false);
        let pos = result.detail(rank, true);

        self.thresholds = ThresholdSet {
            neg_hit: neg.hit,
            neg_med: neg.median(),
            pos_hit: pos.hit,
            pos_med: pos.median(),
        };

        self.add(FieldKind::TotalCount, result.total_count().to_string());
        self.add(FieldKind::Range, result.range().to_string());

        self.add(FieldKind::NegCount, result.negative_peaks().len().to_string());
        self.add(FieldKind::NegRange, neg.range.to_string());
        self.add(FieldKind::NegMax, format!("{:.4}", neg.max));
        self.add(FieldKind::NegMin, format!("{:.4}", neg.min));
        self.add(FieldKind::NegHit, format!("{:.4}", neg.hit));
        self.add(FieldKind::NegMedian, format!("{:.4}", neg.median()));

        self.add(FieldKind::PosCount, result.positive_peaks().len().to_string());
        self.add(FieldKind::PosRange, pos.range.to_string());
        self.add(FieldKind::PosMax, format!("{:.4}", pos.max));
        self.add(FieldKind::PosMin, format!("{:.4}", pos.min));
        self.add(FieldKind::PosHit, format!("{:.4}", pos.hit));
        self.add(FieldKind::PosMedian, format!("{:.4}", pos.median()));
    }

    /// Fields in display order (by each kind's order rank).
    pub fn fields(&self) -> Vec<&Field> {
        self.fields.values().collect()
    }

    pub fn thresholds(&self) -> ThresholdSet {
        self.thresholds
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Peak, Range};
    use pretty_assertions::assert_eq;

    fn peaks(values: &[f32]) -> Vec<Peak> {
        values.iter().map(|&value| Peak { value, step: 1 }).collect()
    }

    fn available_result() -> SessionResult {
        SessionResult::from_parts(
            peaks(&[-5.0, -4.0, -3.0, -2.0, -1.0, -0.8]),
            peaks(&[6.0, 5.0, 4.0, 3.0, 2.0, 1.0]),
            100,
            Range::new(-3.0, 3.0),
        )
    }

    #[test]
    fn test_derive_populates_all_fields_in_order() {
        let mut stats = Statistics::new();
        stats.derive(&available_result(), 3);

        let labels: Vec<&str> = stats.fields().iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Total Samples",
                "Value Range",
                "- Peak Count",
                "- Range",
                "- Min",
                "- Max",
                "- Hit",
                "- Median",
                "+ Peak Count",
                "+ Range",
                "+ Min",
                "+ Max",
                "+ Hit",
                "+ Median",
            ]
        );
    }

    #[test]
    fn test_derive_formats_values() {
        let mut stats = Statistics::new();
        stats.derive(&available_result(), 3);
        let fields = stats.fields();

        assert_eq!(fields[0].value, "100");
        assert_eq!(fields[1].value, "-3.0000 ... 3.0000");
        assert_eq!(fields[2].value, "6"); // negative peak count
        assert_eq!(fields[4].value, "-4.0000"); // - Min (rank - 2)
        assert_eq!(fields[5].value, "-2.0000"); // - Max (rank)
        assert_eq!(fields[6].value, "-3.0000"); // - Hit (rank - 1)
        assert_eq!(fields[7].value, "-3.0000"); // - Median
        assert_eq!(fields[8].value, "6"); // positive peak count
        assert_eq!(fields[10].value, "5.0000"); // + Min
        assert_eq!(fields[11].value, "3.0000"); // + Max
        assert_eq!(fields[12].value, "4.0000"); // + Hit
        assert_eq!(fields[13].value, "4.0000"); // + Median
    }

    #[test]
    fn test_derive_sets_thresholds_from_details() {
        let mut stats = Statistics::new();
        stats.derive(&available_result(), 3);

        assert_eq!(
            stats.thresholds(),
            ThresholdSet {
                neg_hit: -3.0,
                neg_med: -3.0,
                pos_hit: 4.0,
                pos_med: 4.0,
            }
        );
    }

    #[test]
    fn test_derive_unavailable_result_clears_everything() {
        let short = SessionResult::from_parts(
            peaks(&[-1.0; 4]),
            peaks(&[1.0; 7]),
            50,
            Range::new(-1.0, 1.0),
        );

        let mut stats = Statistics::new();
        stats.derive(&available_result(), 3);
        assert!(!stats.is_empty());

        stats.derive(&short, 3);
        assert!(stats.is_empty());
        assert!(stats.thresholds().is_empty());
    }

    #[test]
    fn test_derive_is_idempotent() {
        let result = available_result();
        let mut first = Statistics::new();
        first.derive(&result, 4);
        let mut second = Statistics::new();
        second.derive(&result, 4);
        second.derive(&result, 4);

        let a: Vec<(&str, &str)> = first
            .fields()
            .iter()
            .map(|f| (f.label(), f.value.as_str()))
            .collect();
        let b: Vec<(&str, &str)> = second
            .fields()
            .iter()
            .map(|f| (f.label(), f.value.as_str()))
            .collect();
        assert_eq!(a, b);
        assert_eq!(first.thresholds(), second.thresholds());
    }
}
