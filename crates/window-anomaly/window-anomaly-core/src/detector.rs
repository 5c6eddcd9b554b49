//! Fit/detect orchestration.

use std::sync::Arc;

use tracing::info;
use window_anomaly_api::DetectorConfig;
use window_anomaly_spi::{
    CancellationToken, DetectionReport, NormalizationParams, Reconstructor, Result, Series,
    Threshold, WindowScore,
};

use crate::aggregator::{flag_windows, label_points};
use crate::normalizer::{normalize, Normalizer};
use crate::scorer::Scorer;
use crate::threshold::estimate_threshold;
use crate::windower::make_windows;

/// Reconstruction-error anomaly detector.
///
/// Holds the configuration and the reconstructor. Fitting on a reference
/// series yields an immutable [`FittedDetector`]; the detector itself is
/// never mutated, so it can be fitted any number of times.
#[derive(Clone)]
pub struct WindowAnomalyDetector {
    config: DetectorConfig,
    reconstructor: Arc<dyn Reconstructor>,
}

impl WindowAnomalyDetector {
    /// Create a detector, validating `config`.
    pub fn new<R>(config: DetectorConfig, reconstructor: R) -> Result<Self>
    where
        R: Reconstructor + 'static,
    {
        Self::from_shared(config, Arc::new(reconstructor))
    }

    /// Create a detector around a reconstructor shared with other owners.
    pub fn from_shared(config: DetectorConfig, reconstructor: Arc<dyn Reconstructor>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reconstructor,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Fit normalization statistics and the threshold on known-normal data.
    pub fn fit(&self, reference: &Series) -> Result<FittedDetector> {
        self.fit_with_cancel(reference, &CancellationToken::new())
    }

    /// Like [`fit`](Self::fit), giving up once `cancel` is signalled.
    pub fn fit_with_cancel(
        &self,
        reference: &Series,
        cancel: &CancellationToken,
    ) -> Result<FittedDetector> {
        let params = Normalizer::from_config(self.config.normalization.clone()).fit(reference)?;
        let reference_scores = score_series(
            reference,
            &params,
            &self.config,
            &self.reconstructor,
            cancel,
        )?;
        let threshold = estimate_threshold(&reference_scores)?;

        info!(
            points = reference.len(),
            windows = reference_scores.len(),
            mean = params.mean(),
            std = params.std(),
            threshold = threshold.value(),
            reconstructor = self.reconstructor.name(),
            "fitted window anomaly detector"
        );

        Ok(FittedDetector {
            config: self.config.clone(),
            reconstructor: Arc::clone(&self.reconstructor),
            params,
            threshold,
            reference_scores,
        })
    }
}

impl std::fmt::Debug for WindowAnomalyDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowAnomalyDetector")
            .field("config", &self.config)
            .field("reconstructor", &self.reconstructor.name())
            .finish()
    }
}

/// A detector frozen to one reference series.
#[derive(Clone)]
pub struct FittedDetector {
    config: DetectorConfig,
    reconstructor: Arc<dyn Reconstructor>,
    params: NormalizationParams,
    threshold: Threshold,
    reference_scores: Vec<WindowScore>,
}

impl FittedDetector {
    pub fn params(&self) -> &NormalizationParams {
        &self.params
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Window scores of the reference series the threshold was taken from.
    pub fn reference_scores(&self) -> &[WindowScore] {
        &self.reference_scores
    }

    pub fn window_length(&self) -> usize {
        self.config.window_length
    }

    /// Window scores of `series` without thresholding.
    pub fn score(&self, series: &Series) -> Result<Vec<WindowScore>> {
        score_series(
            series,
            &self.params,
            &self.config,
            &self.reconstructor,
            &CancellationToken::new(),
        )
    }

    /// Score, flag and label every point of `series`.
    pub fn detect(&self, series: &Series) -> Result<DetectionReport> {
        self.detect_with_cancel(series, &CancellationToken::new())
    }

    /// Like [`detect`](Self::detect), giving up once `cancel` is signalled.
    pub fn detect_with_cancel(
        &self,
        series: &Series,
        cancel: &CancellationToken,
    ) -> Result<DetectionReport> {
        let window_length = self.config.window_length;
        let window_scores = score_series(
            series,
            &self.params,
            &self.config,
            &self.reconstructor,
            cancel,
        )?;
        let window_flags = flag_windows(&window_scores, self.threshold);
        let point_labels = label_points(
            &window_flags,
            series.len(),
            window_length,
            self.config.boundary,
        )?;

        let report = DetectionReport {
            threshold: self.threshold,
            window_length,
            timestamps: series.timestamps().to_vec(),
            window_scores,
            window_flags,
            point_labels,
        };

        info!(
            points = series.len(),
            flagged_windows = report.flagged_window_count(),
            anomalies = report.anomaly_count(),
            unevaluated = report.unevaluated_count(),
            "detection complete"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for FittedDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FittedDetector")
            .field("config", &self.config)
            .field("reconstructor", &self.reconstructor.name())
            .field("params", &self.params)
            .field("threshold", &self.threshold)
            .field("reference_windows", &self.reference_scores.len())
            .finish()
    }
}

fn score_series(
    series: &Series,
    params: &NormalizationParams,
    config: &DetectorConfig,
    reconstructor: &Arc<dyn Reconstructor>,
    cancel: &CancellationToken,
) -> Result<Vec<WindowScore>> {
    let normalized = normalize(series, params);
    let windows = make_windows(&normalized, config.window_length)?;
    Scorer::from_config(config.scoring.clone())?.score_windows(&windows, reconstructor, cancel)
}
