//! Calibration session orchestration
//!
//! The session wires the streaming analyzer, the batch statistics pass and
//! the live trial classifier to the host's start/stop/reset commands, and
//! tracks the `Init → Observing → (HasResult | Error)` state machine.
//! `Observing` is re-enterable from either terminal state.
//!
//! The session is not internally thread-safe: samples must be delivered
//! through `push_sample` from a single consumption point, in arrival order,
//! with `stop` sequenced strictly after the last sample that should count.

use crate::analyzer::PeakAnalyzer;
use crate::error::CalibrationError;
use crate::persistence::ThresholdStore;
use crate::result::SessionResult;
use crate::statistics::Statistics;
use crate::trial::TrialClassifier;
use crate::types::{PeakEvent, SessionStatus, ThresholdSet, TrialCounters};
use log::debug;

/// Default rank used for the detail window until the host picks one.
pub const DEFAULT_RANK: usize = 10;

/// The sample-delivering collaborator. The engine only starts and stops it;
/// sensor registration is entirely the host's concern.
pub trait SampleSource {
    fn start(&mut self);
    fn stop(&mut self);
}

/// No-op source for embedders that manage the sensor subscription
/// themselves and push samples directly (the FFI host does this).
#[derive(Debug, Default)]
pub struct HostDrivenSource;

impl SampleSource for HostDrivenSource {
    fn start(&mut self) {}
    fn stop(&mut self) {}
}

/// Explicit event emission toward the display host: peaks as they are
/// detected and state transitions as they happen.
pub trait SessionListener {
    fn on_peak(&mut self, _event: PeakEvent) {}
    fn on_status(&mut self, _status: SessionStatus) {}
}

/// Orchestrates one calibration workflow over an injected sample source.
pub struct CalibrationSession<S: SampleSource> {
    source: S,
    analyzer: PeakAnalyzer,
    classifier: TrialClassifier,
    statistics: Statistics,
    result: Option<SessionResult>,
    status: SessionStatus,
    rank: usize,
    listener: Option<Box<dyn SessionListener>>,
}

impl Default for CalibrationSession<HostDrivenSource> {
    fn default() -> Self {
        Self::new(HostDrivenSource)
    }
}

impl<S: SampleSource> CalibrationSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            analyzer: PeakAnalyzer::new(),
            classifier: TrialClassifier::new(),
            statistics: Statistics::new(),
            result: None,
            status: SessionStatus::Init,
            rank: DEFAULT_RANK,
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: Box<dyn SessionListener>) {
        self.listener = Some(listener);
    }

    fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        if let Some(listener) = self.listener.as_mut() {
            listener.on_status(status);
        }
    }

    /// Begin observing. No-op while already observing.
    pub fn start(&mut self) {
        if self.status == SessionStatus::Observing {
            return;
        }
        debug!("session start");
        self.result = None;
        self.analyzer.reset();
        self.set_status(SessionStatus::Observing);
        self.source.start();
    }

    /// Deliver one sample. Ignored outside the observing state; the
    /// subscription is only live between `start` and `stop`.
    pub fn push_sample(&mut self, v: f32) {
        if self.status != SessionStatus::Observing {
            return;
        }
        if let Some(event) = self.analyzer.update(v) {
            self.classifier.on_peak(event);
            if let Some(listener) = self.listener.as_mut() {
                listener.on_peak(event);
            }
        }
    }

    /// Stop observing: cancel the source first, then freeze the analyzer
    /// state and derive statistics. No sample is processed after the
    /// snapshot is taken.
    pub fn stop(&mut self) {
        if self.status != SessionStatus::Observing {
            return;
        }
        debug!("session stop");
        self.source.stop();
        self.analyze();
    }

    /// Start/stop by current state.
    pub fn toggle(&mut self) {
        if self.status == SessionStatus::Observing {
            self.stop();
        } else {
            self.start();
        }
    }

    fn analyze(&mut self) {
        debug!("session analyze");
        let result = SessionResult::build(&self.analyzer);
        if !result.available() || result.efficient_sample_count() < 2 {
            self.result = None;
            self.statistics.clear();
            self.set_status(SessionStatus::Error);
        } else {
            self.result = Some(result);
            self.update_statistics();
            self.set_status(SessionStatus::HasResult);
        }
    }

    fn update_statistics(&mut self) {
        if let Some(result) = self.result.as_ref() {
            let efficient = result.efficient_sample_count() as usize;
            let rank = self.rank.clamp(2, efficient);
            self.statistics.derive(result, rank);
        }
    }

    /// Discard the held result and return to the initial state. Guarded
    /// no-op while observing.
    pub fn reset(&mut self) {
        if self.status == SessionStatus::Observing {
            debug!("session reset ignored while observing");
            return;
        }
        debug!("session reset");
        self.analyzer.reset();
        self.result = None;
        self.statistics.clear();
        self.set_status(SessionStatus::Init);
    }

    /// Change the target rank; re-derives statistics when a result is held.
    pub fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
        self.update_statistics();
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Adopt the currently derived thresholds into the trial classifier and
    /// persist them through `store`.
    pub fn register(
        &mut self,
        store: &mut dyn ThresholdStore,
    ) -> Result<ThresholdSet, CalibrationError> {
        let thresholds = self.statistics.thresholds();
        if thresholds.is_empty() {
            return Err(CalibrationError::InsufficientData(
                "no derived thresholds to register".to_string(),
            ));
        }
        self.classifier.set_thresholds(thresholds);
        store.save(Some(&thresholds))?;
        Ok(thresholds)
    }

    /// Feed a previously persisted threshold set straight to the classifier.
    pub fn adopt_thresholds(&mut self, thresholds: ThresholdSet) {
        self.classifier.set_thresholds(thresholds);
    }

    /// Zero the live trial counters; the registered thresholds stay.
    pub fn reset_trial(&mut self) {
        self.classifier.reset();
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn trial_counters(&self) -> TrialCounters {
        self.classifier.counters()
    }

    pub fn sample_count(&self) -> u32 {
        self.analyzer.total_count()
    }
}
