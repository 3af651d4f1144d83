//! Error types for Resona Core

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Ingest errors
    #[error("Recording already indexed: {id}")]
    RecordingExists { id: String },

    #[error("Sample rate mismatch: expected {expected} Hz, got {got} Hz")]
    SampleRateMismatch { expected: u32, got: u32 },

    // Snapshot errors
    #[error("Snapshot incompatible: {0}")]
    SnapshotIncompatible(String),

    #[error("Snapshot decode failed: {0}")]
    SnapshotDecode(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Returns true if the engine can keep serving with its previous state
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::RecordingExists { .. }
                | Error::SampleRateMismatch { .. }
                | Error::SnapshotIncompatible(_)
                | Error::SnapshotDecode(_)
        )
    }

    /// Returns the error code for adapter responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::RecordingExists { .. } => "RECORDING_EXISTS",
            Error::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            Error::SnapshotIncompatible(_) => "SNAPSHOT_INCOMPATIBLE",
            Error::SnapshotDecode(_) => "SNAPSHOT_DECODE",
            Error::Internal(_) => "INTERNAL",
            Error::Io(_) => "IO",
        }
    }
}
