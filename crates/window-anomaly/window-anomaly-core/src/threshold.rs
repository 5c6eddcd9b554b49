//! Threshold estimation from a reference score distribution.

use tracing::debug;
use window_anomaly_spi::{AnomalyError, Result, Threshold, WindowScore};

/// Largest reference score.
///
/// Any error seen on known-normal data counts as normal variation; only
/// strictly larger errors are anomalous.
pub fn estimate_threshold(scores: &[WindowScore]) -> Result<Threshold> {
    let mut max: Option<f64> = None;
    for score in scores {
        if !score.score.is_finite() {
            return Err(AnomalyError::ScoreComputation {
                start: score.start,
                reason: format!("reference score {} is not finite", score.score),
            });
        }
        max = Some(match max {
            Some(current) => current.max(score.score),
            None => score.score,
        });
    }

    let value = max.ok_or(AnomalyError::EmptyScoreSet)?;
    debug!(windows = scores.len(), threshold = value, "estimated threshold");
    Threshold::new(value)
}
