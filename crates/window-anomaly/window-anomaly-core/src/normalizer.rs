//! Reference statistics and z-normalization.

use tracing::debug;
use window_anomaly_api::{NormalizationConfig, StdEstimator};
use window_anomaly_spi::{AnomalyError, NormalizationParams, NormalizedSeries, Result, Series};

/// Fits [`NormalizationParams`] from a reference series.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizationConfig,
}

impl Normalizer {
    pub fn new(estimator: StdEstimator, degenerate_tolerance: f64) -> Self {
        Self {
            config: NormalizationConfig::new(estimator, degenerate_tolerance),
        }
    }

    /// Create from configuration.
    pub fn from_config(config: NormalizationConfig) -> Self {
        Self { config }
    }

    /// Compute mean and standard deviation over every value of `reference`.
    pub fn fit(&self, reference: &Series) -> Result<NormalizationParams> {
        let data = reference.values();
        if data.is_empty() {
            return Err(AnomalyError::DegenerateInput(
                "reference series is empty".to_string(),
            ));
        }

        let divisor = match self.config.estimator {
            StdEstimator::Population => data.len(),
            StdEstimator::Sample => data.len() - 1,
        };
        if divisor == 0 {
            return Err(AnomalyError::DegenerateInput(
                "sample standard deviation needs at least 2 points".to_string(),
            ));
        }

        if data.iter().any(|x| !x.is_finite()) {
            return Err(AnomalyError::DegenerateInput(
                "reference series contains non-finite values".to_string(),
            ));
        }
        if data.iter().all(|&x| x == data[0]) {
            return Err(AnomalyError::DegenerateInput(format!(
                "reference series is constant at {}",
                data[0]
            )));
        }

        let n = data.len() as f64;
        let naive = data.iter().sum::<f64>() / n;
        // Second pass removes the rounding drift of the plain sum.
        let mean = naive + data.iter().map(|x| x - naive).sum::<f64>() / n;
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / divisor as f64;
        let std = variance.sqrt();

        if !mean.is_finite() || !std.is_finite() {
            return Err(AnomalyError::DegenerateInput(
                "reference statistics overflowed".to_string(),
            ));
        }
        // Relative to the magnitude of the data, so large constant-ish levels
        // cannot slip past on rounding noise.
        let floor = self.config.degenerate_tolerance * mean.abs().max(1.0);
        if std <= floor {
            return Err(AnomalyError::DegenerateInput(format!(
                "reference standard deviation {:e} is not above tolerance {:e}",
                std, floor
            )));
        }

        debug!(points = data.len(), mean, std, "fitted normalization parameters");
        NormalizationParams::new(mean, std)
    }
}

/// Z-normalize `series` under fixed `params`.
pub fn normalize(series: &Series, params: &NormalizationParams) -> NormalizedSeries {
    debug!(points = series.len(), "normalizing series");
    params.normalize(series)
}
