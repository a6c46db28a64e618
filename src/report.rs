//! Report encoding
//!
//! Renders the current session state into a versioned JSON payload for the
//! display host: producer metadata, the ordered statistics fields, the
//! derived thresholds and the live trial counters.

use crate::error::CalibrationError;
use crate::session::{CalibrationSession, SampleSource};
use crate::types::{SessionStatus, ThresholdSet, TrialCounters};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// One label/value pair, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportField {
    pub label: String,
    pub value: String,
}

/// Complete report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub status: SessionStatus,
    pub fields: Vec<ReportField>,
    pub thresholds: ThresholdSet,
    pub trial: TrialCounters,
}

/// Encodes session state into report payloads.
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Snapshot the session into a report payload.
    pub fn encode<S: SampleSource>(&self, session: &CalibrationSession<S>) -> CalibrationReport {
        let fields = session
            .statistics()
            .fields()
            .into_iter()
            .map(|f| ReportField {
                label: f.label().to_string(),
                value: f.value.clone(),
            })
            .collect();

        CalibrationReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            status: session.status(),
            fields,
            thresholds: session.statistics().thresholds(),
            trial: session.trial_counters(),
        }
    }

    /// Encode to a JSON string.
    pub fn encode_to_json<S: SampleSource>(
        &self,
        session: &CalibrationSession<S>,
    ) -> Result<String, CalibrationError> {
        let report = self.encode(session);
        serde_json::to_string_pretty(&report).map_err(CalibrationError::JsonError)
    }
}
