//! Threshold persistence
//!
//! The engine persists a registered threshold set as four named floats plus
//! a presence flag. Saving nothing, or the empty sentinel, is a no-op so a
//! stored calibration is never clobbered by an unset one. Loading returns
//! `None` when the presence flag is unset; individually missing floats
//! default to zero.

use crate::error::CalibrationError;
use crate::types::ThresholdSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load/save contract for a registered threshold set.
pub trait ThresholdStore {
    /// Durably store `thresholds`. No-op for `None` or the empty sentinel.
    fn save(&mut self, thresholds: Option<&ThresholdSet>) -> Result<(), CalibrationError>;

    /// Reconstruct the stored set, or `None` if nothing was ever stored.
    fn load(&self) -> Result<Option<ThresholdSet>, CalibrationError>;
}

/// In-memory store for tests and hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryThresholdStore {
    stored: Option<ThresholdSet>,
}

impl ThresholdStore for MemoryThresholdStore {
    fn save(&mut self, thresholds: Option<&ThresholdSet>) -> Result<(), CalibrationError> {
        match thresholds {
            Some(t) if !t.is_empty() => {
                self.stored = Some(*t);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn load(&self) -> Result<Option<ThresholdSet>, CalibrationError> {
        Ok(self.stored)
    }
}

/// On-disk JSON record: the four floats, the presence flag and the save
/// timestamp. Fields absent in older documents fall back to their defaults.
#[derive(Debug, Serialize, Deserialize)]
struct ThresholdRecord {
    has_data: bool,
    #[serde(default)]
    neg_hit: f32,
    #[serde(default)]
    neg_med: f32,
    #[serde(default)]
    pos_hit: f32,
    #[serde(default)]
    pos_med: f32,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

/// File-backed store keeping the threshold record as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileThresholdStore {
    path: PathBuf,
}

impl JsonFileThresholdStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ThresholdStore for JsonFileThresholdStore {
    fn save(&mut self, thresholds: Option<&ThresholdSet>) -> Result<(), CalibrationError> {
        let t = match thresholds {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(()),
        };
        let record = ThresholdRecord {
            has_data: true,
            neg_hit: t.neg_hit,
            neg_med: t.neg_med,
            pos_hit: t.pos_hit,
            pos_med: t.pos_med,
            saved_at: Some(Utc::now()),
        };
        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<ThresholdSet>, CalibrationError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        let record: ThresholdRecord = serde_json::from_str(&json)?;
        if !record.has_data {
            return Ok(None);
        }
        Ok(Some(ThresholdSet {
            neg_hit: record.neg_hit,
            neg_med: record.neg_med,
            pos_hit: record.pos_hit,
            pos_med: record.pos_med,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn sample_set() -> ThresholdSet {
        ThresholdSet {
            neg_hit: -1.5,
            neg_med: -0.75,
            pos_hit: 1.25,
            pos_med: 0.6,
        }
    }

    fn temp_store() -> JsonFileThresholdStore {
        let path = std::env::temp_dir().join(format!("kinecal-test-{}.json", Uuid::new_v4()));
        JsonFileThresholdStore::new(path)
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryThresholdStore::default();
        assert_eq!(store.load().unwrap(), None);

        store.save(Some(&sample_set())).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_set()));
    }

    #[test]
    fn test_empty_sentinel_save_is_noop() {
        let mut store = MemoryThresholdStore::default();
        store.save(Some(&sample_set())).unwrap();

        store.save(Some(&ThresholdSet::EMPTY)).unwrap();
        store.save(None).unwrap();
        // The previously stored set survives both no-op saves.
        assert_eq!(store.load().unwrap(), Some(sample_set()));
    }

    #[test]
    fn test_empty_sentinel_save_is_noop_when_nothing_stored() {
        let mut store = MemoryThresholdStore::default();
        store.save(Some(&ThresholdSet::EMPTY)).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_round_trip() {
        let mut store = temp_store();
        assert_eq!(store.load().unwrap(), None);

        store.save(Some(&sample_set())).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_set()));

        // Empty save leaves the file untouched.
        store.save(Some(&ThresholdSet::EMPTY)).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample_set()));

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_file_store_missing_floats_default_to_zero() {
        let store = temp_store();
        fs::write(store.path(), r#"{"has_data": true, "pos_hit": 0.5}"#).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded,
            Some(ThresholdSet {
                neg_hit: 0.0,
                neg_med: 0.0,
                pos_hit: 0.5,
                pos_med: 0.0,
            })
        );

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_file_store_unset_presence_flag_loads_none() {
        let store = temp_store();
        fs::write(store.path(), r#"{"has_data": false, "pos_hit": 0.5}"#).unwrap();
        assert_eq!(store.load().unwrap(), None);
        let _ = fs::remove_file(store.path());
    }
}
