//! Kinecal - On-device calibration engine for motion-sensor jump detection
//!
//! Kinecal consumes a stream of scalar motion-sensor samples, detects discrete
//! physical events (jump impacts) on-line, derives classification thresholds
//! from the observed peak distribution, and labels subsequent peaks live as
//! "hit" or "near-miss" events: sample stream → peak detection → result
//! snapshot → statistics/thresholds → live trial.
//!
//! ## Modules
//!
//! - **analyzer**: streaming extremum detection over the raw sample stream
//! - **result / statistics**: batch snapshot, ranked window extraction and
//!   threshold derivation once sampling stops
//! - **trial**: live classification of incoming peaks under registered thresholds
//! - **session**: start/stop/reset orchestration and state machine
//! - **persistence / report**: threshold storage and display payloads

pub mod analyzer;
pub mod error;
pub mod persistence;
pub mod report;
pub mod result;
pub mod session;
pub mod statistics;
pub mod trial;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use analyzer::PeakAnalyzer;
pub use error::CalibrationError;
pub use persistence::{JsonFileThresholdStore, MemoryThresholdStore, ThresholdStore};
pub use report::ReportEncoder;
pub use result::{Detail, SessionResult};
pub use session::{CalibrationSession, HostDrivenSource, SampleSource, SessionListener};
pub use statistics::{Field, FieldKind, Statistics};
pub use trial::TrialClassifier;
pub use types::{Peak, PeakEvent, Polarity, Range, SessionStatus, ThresholdSet, TrialCounters};

/// Engine version embedded in all report payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "kinecal";
