//! Error types for Kinecal

use thiserror::Error;

/// Errors surfaced at the engine's fallible boundaries.
///
/// The streaming core itself never fails: insufficient data is a session
/// state, not an error, and invalid ranks are clamped by the session. These
/// variants cover persistence, report encoding and the CLI/FFI surfaces.
#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid rank: {0}")]
    InvalidRank(String),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
