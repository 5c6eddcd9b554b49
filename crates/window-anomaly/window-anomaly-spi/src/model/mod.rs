//! Data models for window anomaly detection.
//!
//! This module contains the values that flow between pipeline stages. All of
//! them are immutable once produced.

mod label;
mod report;
mod series;
mod window;

pub use label::PointLabel;
pub use report::DetectionReport;
pub use series::{NormalizationParams, NormalizedSeries, Series, TimePoint};
pub use window::{Threshold, Window, WindowScore};
