//! Detection result types.

use serde::{Deserialize, Serialize};

use super::{PointLabel, Series, Threshold, TimePoint, WindowScore};

/// Outcome of scoring and labelling one evaluation series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Threshold the window scores were compared against.
    pub threshold: Threshold,
    /// Window length used for scoring.
    pub window_length: usize,
    /// Timestamps of the evaluated series, one per point.
    pub timestamps: Vec<i64>,
    /// Reconstruction error per window, ordered by start index.
    pub window_scores: Vec<WindowScore>,
    /// `score > threshold` per window, ordered by start index.
    pub window_flags: Vec<bool>,
    /// Label per series index.
    pub point_labels: Vec<PointLabel>,
}

impl DetectionReport {
    /// Indices labelled anomalous, increasing and without duplicates.
    pub fn anomalous_indices(&self) -> Vec<usize> {
        self.point_labels
            .iter()
            .enumerate()
            .filter_map(|(i, label)| if label.is_anomalous() { Some(i) } else { None })
            .collect()
    }

    /// Timestamps of the anomalous indices.
    pub fn anomalous_timestamps(&self) -> Vec<i64> {
        self.anomalous_indices()
            .into_iter()
            .filter_map(|i| self.timestamps.get(i).copied())
            .collect()
    }

    /// Raw points of `series` at the anomalous indices.
    ///
    /// `series` is expected to be the raw series this report was produced from.
    pub fn anomalous_points(&self, series: &Series) -> Vec<TimePoint> {
        self.anomalous_indices()
            .into_iter()
            .filter_map(|i| series.get(i))
            .collect()
    }

    pub fn anomaly_count(&self) -> usize {
        self.point_labels.iter().filter(|l| l.is_anomalous()).count()
    }

    pub fn flagged_window_count(&self) -> usize {
        self.window_flags.iter().filter(|&&f| f).count()
    }

    pub fn unevaluated_count(&self) -> usize {
        self.point_labels.iter().filter(|l| !l.is_evaluated()).count()
    }
}
