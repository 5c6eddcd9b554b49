//! Window Anomaly Detection API
//!
//! Configuration types for window anomaly detection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use window_anomaly_spi::{AnomalyError, DetectionReport, PointLabel, Result, Threshold};

// ============================================================================
// Normalization Configuration
// ============================================================================

/// Standard deviation estimator used when fitting normalization statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdEstimator {
    /// Divide by `N`.
    #[default]
    Population,
    /// Divide by `N - 1`.
    Sample,
}

/// Normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Estimator for the reference standard deviation (default: population).
    pub estimator: StdEstimator,
    /// A fitted std at or below `tolerance * max(|mean|, 1)` is treated as
    /// zero (default: 1e-10).
    pub degenerate_tolerance: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            estimator: StdEstimator::Population,
            degenerate_tolerance: 1e-10,
        }
    }
}

impl NormalizationConfig {
    pub fn new(estimator: StdEstimator, degenerate_tolerance: f64) -> Self {
        Self {
            estimator,
            degenerate_tolerance,
        }
    }
}

// ============================================================================
// Scoring Configuration
// ============================================================================

/// Scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Compute window errors on the rayon pool (default: false).
    pub parallel: bool,
    /// Upper bound on a single reconstructor call, in milliseconds (default: none).
    ///
    /// The call runs on a worker thread. On expiry only the call's own token is
    /// cancelled and the worker is detached: a reconstructor that never polls
    /// its token keeps running to completion in the background, and its result
    /// is dropped.
    pub timeout_ms: Option<u64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            timeout_ms: None,
        }
    }
}

impl ScoringConfig {
    pub fn new(parallel: bool, timeout: Option<Duration>) -> Self {
        Self {
            parallel,
            timeout_ms: timeout.map(timeout_to_millis),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reject a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == Some(0) {
            return Err(AnomalyError::InvalidParameter {
                name: "timeout_ms".to_string(),
                reason: "must be positive when set".to_string(),
            });
        }
        Ok(())
    }
}

/// Whole milliseconds, rounded up so a sub-millisecond timeout stays positive.
fn timeout_to_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

// ============================================================================
// Aggregation Configuration
// ============================================================================

/// Which points near the series edges are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Label every point, using whichever covering windows exist.
    #[default]
    Clamped,
    /// Leave the first and last `W - 1` points unevaluated.
    InteriorOnly,
}

// ============================================================================
// Detector Configuration
// ============================================================================

/// Window anomaly detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Window length `W` (default: 288, one day of five-minute samples).
    pub window_length: usize,
    #[serde(default)]
    pub normalization: NormalizationConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub boundary: BoundaryPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_length: 288,
            normalization: NormalizationConfig::default(),
            scoring: ScoringConfig::default(),
            boundary: BoundaryPolicy::default(),
        }
    }
}

impl DetectorConfig {
    pub fn new(window_length: usize) -> Self {
        Self {
            window_length,
            ..Default::default()
        }
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_estimator(mut self, estimator: StdEstimator) -> Self {
        self.normalization.estimator = estimator;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.scoring.parallel = parallel;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.scoring.timeout_ms = Some(timeout_to_millis(timeout));
        self
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| AnomalyError::InvalidParameter {
            name: "config".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.window_length == 0 {
            return Err(AnomalyError::InvalidParameter {
                name: "window_length".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        let tolerance = self.normalization.degenerate_tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(AnomalyError::InvalidParameter {
                name: "degenerate_tolerance".to_string(),
                reason: "must be finite and non-negative".to_string(),
            });
        }
        self.scoring.validate()
    }
}
