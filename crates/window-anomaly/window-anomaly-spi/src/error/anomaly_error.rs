//! Window anomaly detection error types.

use thiserror::Error;

/// Window anomaly detection errors.
///
/// Every variant is reported to the caller as-is. Nothing in the pipeline
/// substitutes defaults or retries on its own.
#[derive(Debug, Error)]
pub enum AnomalyError {
    /// Reference series is empty or has (near) zero variance.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid window length: {length} for series of length {series_len}")]
    InvalidWindowLength { length: usize, series_len: usize },

    /// A non-finite value entered or left the error computation.
    #[error("Score computation failed for window {start}: {reason}")]
    ScoreComputation { start: usize, reason: String },

    #[error("Cannot estimate a threshold from an empty score set")]
    EmptyScoreSet,

    /// The external reconstructor failed or violated its shape contract.
    #[error("Reconstruction failed: {0}")]
    Reconstruction(String),

    /// The external reconstructor exceeded its time budget or was cancelled.
    #[error("Reconstruction timed out: {0}")]
    ReconstructionTimeout(String),

    #[error("Series timestamps must be strictly increasing (violated at index {index})")]
    UnorderedSeries { index: usize },

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl AnomalyError {
    /// Whether repeating the same call may succeed.
    ///
    /// Only timeouts are transient; the decision to retry stays with the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnomalyError::ReconstructionTimeout(_))
    }
}

/// Result type for window anomaly detection operations.
pub type Result<T> = std::result::Result<T, AnomalyError>;
